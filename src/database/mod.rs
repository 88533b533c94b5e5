// ABOUTME: SQLite database connection management and schema setup
// ABOUTME: Exposes per-area store handles (users, tasks, conversations)
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Database Layer
//!
//! A single [`SqlitePool`] backs three store handles, one per area of the
//! data model. The schema is applied at startup; all statements are runtime
//! queries with explicit binds and every user-scoped statement carries
//! `user_id` in its WHERE clause.

pub mod chat;
pub mod tasks;
pub mod users;

pub use chat::ConversationStore;
pub use tasks::TaskStore;
pub use users::UserStore;

use crate::errors::{AppError, AppResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Schema applied on startup. Idempotent; `ON DELETE CASCADE` implements the
/// user-owns-everything lifecycle.
const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    email           TEXT NOT NULL UNIQUE,
    name            TEXT NOT NULL,
    password_hash   TEXT NOT NULL,
    created_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id         INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title           TEXT NOT NULL,
    description     TEXT,
    completed       INTEGER NOT NULL DEFAULT 0,
    priority        TEXT NOT NULL DEFAULT 'medium',
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_tasks_user ON tasks(user_id);

CREATE TABLE IF NOT EXISTS conversations (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id         INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title           TEXT NOT NULL DEFAULT 'New Conversation',
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_conversations_user ON conversations(user_id);

CREATE TABLE IF NOT EXISTS messages (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    conversation_id INTEGER NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
    role            TEXT NOT NULL,
    content         TEXT NOT NULL,
    tool_calls      TEXT,
    tool_results    TEXT,
    created_at      TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_messages_conversation ON messages(conversation_id);
";

/// Database handle wrapping the connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the database and apply the schema
    ///
    /// In-memory databases are pinned to a single connection so every query
    /// sees the same store.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the connection fails, or the
    /// schema cannot be applied.
    pub async fn connect(database_url: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::config(format!("Invalid database URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect: {e}")))?;

        sqlx::raw_sql(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply schema: {e}")))?;

        Ok(Self { pool })
    }

    /// User account store
    #[must_use]
    pub fn users(&self) -> UserStore {
        UserStore::new(self.pool.clone())
    }

    /// Task store
    #[must_use]
    pub fn tasks(&self) -> TaskStore {
        TaskStore::new(self.pool.clone())
    }

    /// Conversation and message store
    #[must_use]
    pub fn conversations(&self) -> ConversationStore {
        ConversationStore::new(self.pool.clone())
    }
}
