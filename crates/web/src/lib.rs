//! To-Do Lists Web Application
//!
//! A small server-rendered to-do list app. Each list lives at its own
//! `/lists/<id>/` URL; the home page starts a new one. Storage is in memory.

pub mod pages;
pub mod server;
pub mod store;

pub use server::{WebServer, WebServerConfig};
pub use store::{ListId, ListStore, TodoList};
