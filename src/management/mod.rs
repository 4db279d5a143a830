//! # Persistence
//!
//! Relational storage for sessions, OAuth credentials and search history,
//! backed by a `sqlx` SQLite pool. The schema is created on connect.

mod db;
mod history;
mod sessions;
mod tokens;

use thiserror::Error;

pub use db::{connect, ping};
pub use history::{HISTORY_LIMIT, HistoryStore};
pub use sessions::SessionStore;
pub use tokens::TokenStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
