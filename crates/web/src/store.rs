//! In-memory list storage

use std::collections::HashMap;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Identifier of a to-do list, allocated sequentially from 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListId(pub u64);

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ListId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(ListId)
    }
}

/// A single to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub text: String,
}

/// A to-do list with its items in insertion order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoList {
    pub id: ListId,
    pub items: Vec<Item>,
}

impl TodoList {
    /// Path under which this list is served
    pub fn url(&self) -> String {
        list_url(self.id)
    }

    /// Rendered row texts, `"<position>: <text>"` with 1-based positions
    pub fn rows(&self) -> Vec<String> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}: {}", i + 1, item.text))
            .collect()
    }
}

/// Path of the page showing a list
pub fn list_url(id: ListId) -> String {
    format!("/lists/{}/", id)
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("You can't have an empty list item")]
    EmptyItem,

    #[error("List not found: {0}")]
    ListNotFound(ListId),
}

/// Thread-safe in-memory store of to-do lists
#[derive(Debug)]
pub struct ListStore {
    lists: RwLock<HashMap<ListId, TodoList>>,
    next_id: AtomicU64,
}

impl Default for ListStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ListStore {
    pub fn new() -> Self {
        Self {
            lists: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a new list holding `first_item`
    pub fn create_list(&self, first_item: &str) -> Result<ListId, StoreError> {
        let item = validate(first_item)?;
        let id = ListId(self.next_id.fetch_add(1, Ordering::Relaxed));

        self.lists.write().insert(
            id,
            TodoList {
                id,
                items: vec![item],
            },
        );

        debug!("Created list {}", id);
        Ok(id)
    }

    /// Append an item to an existing list, returning its 1-based position
    pub fn add_item(&self, id: ListId, text: &str) -> Result<usize, StoreError> {
        let item = validate(text)?;
        let mut lists = self.lists.write();
        let list = lists.get_mut(&id).ok_or(StoreError::ListNotFound(id))?;
        list.items.push(item);

        debug!("Added item #{} to list {}", list.items.len(), id);
        Ok(list.items.len())
    }

    pub fn get(&self, id: ListId) -> Option<TodoList> {
        self.lists.read().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lists.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn validate(text: &str) -> Result<Item, StoreError> {
    if text.trim().is_empty() {
        return Err(StoreError::EmptyItem);
    }
    Ok(Item {
        text: text.to_string(),
    })
}
