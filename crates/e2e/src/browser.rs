//! Browser automation seam
//!
//! Scenarios talk to the browser only through [`Browser`]: navigate, read
//! the title and URL, read element text and attributes, send keys, quit.
//! [`BrowserFactory`] hands out fresh sessions, each with its own cookies.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::E2eResult;

/// How an element on the page is located
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Element with this `id` attribute
    Id(String),
    /// First element with this tag name
    Tag(String),
}

impl Target {
    pub fn id(id: impl Into<String>) -> Self {
        Target::Id(id.into())
    }

    pub fn tag(tag: impl Into<String>) -> Self {
        Target::Tag(tag.into())
    }

    /// CSS selector equivalent of this target
    pub fn css(&self) -> String {
        match self {
            Target::Id(id) => format!("#{}", id),
            Target::Tag(tag) => tag.clone(),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.css())
    }
}

/// Special keys that can be sent to an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Enter,
    Tab,
    Escape,
}

impl Key {
    pub fn as_str(&self) -> &'static str {
        match self {
            Key::Enter => "enter",
            Key::Tab => "tab",
            Key::Escape => "escape",
        }
    }
}

/// One browser session
#[async_trait]
pub trait Browser: Send + Sync {
    /// Navigate to an absolute URL
    async fn goto(&self, url: &str) -> E2eResult<()>;

    async fn title(&self) -> E2eResult<String>;

    async fn current_url(&self) -> E2eResult<String>;

    /// Visible text of the element
    async fn text(&self, target: &Target) -> E2eResult<String>;

    /// Visible text of every `child` element inside `parent`, in document order
    async fn child_texts(&self, parent: &Target, child: &Target) -> E2eResult<Vec<String>>;

    async fn attribute(&self, target: &Target, name: &str) -> E2eResult<Option<String>>;

    /// Type text into the element
    async fn send_keys(&self, target: &Target, text: &str) -> E2eResult<()>;

    async fn press_key(&self, target: &Target, key: Key) -> E2eResult<()>;

    /// End the session; the browser is unusable afterwards
    async fn quit(&self) -> E2eResult<()>;
}

/// Creates independent browser sessions
#[async_trait]
pub trait BrowserFactory: Send + Sync {
    async fn launch(&self) -> E2eResult<Box<dyn Browser>>;
}
