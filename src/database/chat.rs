// ABOUTME: Conversation and message persistence with per-user ownership
// ABOUTME: Append-only messages, derived message counts, updated_at bumps in one transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation store
//!
//! Conversations are created implicitly on first chat message via
//! [`ConversationStore::create_if_absent`]. Messages are append-only and
//! replayed in creation order; appending a message bumps the conversation's
//! `updated_at` in the same transaction so list ordering stays consistent.

use crate::errors::{AppError, AppResult};
use crate::models::{now_rfc3339, Conversation, Message, MessageRole, ToolCall, ToolResult};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;

/// Title assigned before the first turn derives one
const DEFAULT_TITLE: &str = "New Conversation";

/// Conversation and message store handle
pub struct ConversationStore {
    pool: SqlitePool,
}

impl ConversationStore {
    /// Create a new conversation store
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a fresh conversation for a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create(&self, user_id: i64) -> AppResult<Conversation> {
        let now = now_rfc3339();

        let result = sqlx::query(
            r"
            INSERT INTO conversations (user_id, title, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            ",
        )
        .bind(user_id)
        .bind(DEFAULT_TITLE)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create conversation: {e}")))?;

        Ok(Conversation {
            id: result.last_insert_rowid(),
            user_id,
            title: DEFAULT_TITLE.to_owned(),
            created_at: now.clone(),
            updated_at: now,
            message_count: 0,
        })
    }

    /// Get a conversation owned by the user, with its message count
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get(&self, conversation_id: i64, user_id: i64) -> AppResult<Option<Conversation>> {
        let row = sqlx::query(
            r"
            SELECT c.id, c.user_id, c.title, c.created_at, c.updated_at,
                   COUNT(m.id) AS message_count
            FROM conversations c
            LEFT JOIN messages m ON m.conversation_id = c.id
            WHERE c.id = $1 AND c.user_id = $2
            GROUP BY c.id
            ",
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get conversation: {e}")))?;

        Ok(row.map(conversation_from_row))
    }

    /// Resolve the conversation a chat turn targets: the caller's existing
    /// conversation if the id is present and owned, otherwise a fresh one.
    ///
    /// An explicit upsert keyed by `(user_id, conversation_id | null)`; a
    /// foreign or stale id silently falls back to a new conversation rather
    /// than leaking existence.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create_if_absent(
        &self,
        user_id: i64,
        conversation_id: Option<i64>,
    ) -> AppResult<Conversation> {
        if let Some(id) = conversation_id {
            if let Some(existing) = self.get(id, user_id).await? {
                return Ok(existing);
            }
            tracing::warn!(
                conversation_id = id,
                user_id,
                "conversation not found for user, creating a new one"
            );
        }
        self.create(user_id).await
    }

    /// List a user's conversations, most recently updated first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list_for_user(&self, user_id: i64) -> AppResult<Vec<Conversation>> {
        let rows = sqlx::query(
            r"
            SELECT c.id, c.user_id, c.title, c.created_at, c.updated_at,
                   COUNT(m.id) AS message_count
            FROM conversations c
            LEFT JOIN messages m ON m.conversation_id = c.id
            WHERE c.user_id = $1
            GROUP BY c.id
            ORDER BY c.updated_at DESC, c.id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list conversations: {e}")))?;

        Ok(rows.into_iter().map(conversation_from_row).collect())
    }

    /// Append a message and bump the conversation's `updated_at` atomically
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn append_message(
        &self,
        conversation_id: i64,
        role: MessageRole,
        content: &str,
        tool_calls: Option<&[ToolCall]>,
        tool_results: Option<&[ToolResult]>,
    ) -> AppResult<Message> {
        let now = now_rfc3339();
        let tool_calls_json = encode_json(tool_calls)?;
        let tool_results_json = encode_json(tool_results)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        let result = sqlx::query(
            r"
            INSERT INTO messages (conversation_id, role, content, tool_calls, tool_results, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(conversation_id)
        .bind(role.as_str())
        .bind(content)
        .bind(&tool_calls_json)
        .bind(&tool_results_json)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::database(format!("Failed to append message: {e}")))?;

        sqlx::query("UPDATE conversations SET updated_at = $1 WHERE id = $2")
            .bind(&now)
            .bind(conversation_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to bump conversation: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit message: {e}")))?;

        Ok(Message {
            id: result.last_insert_rowid(),
            conversation_id,
            role,
            content: content.to_owned(),
            tool_calls: tool_calls.map(<[ToolCall]>::to_vec),
            tool_results: tool_results.map(<[ToolResult]>::to_vec),
            created_at: now,
        })
    }

    /// All messages of a conversation in creation order
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the conversation is absent or not owned.
    pub async fn messages(&self, conversation_id: i64, user_id: i64) -> AppResult<Vec<Message>> {
        // Ownership check first so a foreign conversation reads as absent
        if self.get(conversation_id, user_id).await?.is_none() {
            return Err(AppError::not_found("Conversation"));
        }

        let rows = sqlx::query(
            r"
            SELECT id, conversation_id, role, content, tool_calls, tool_results, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list messages: {e}")))?;

        rows.into_iter().map(message_from_row).collect()
    }

    /// Set a conversation's title (used for first-turn title derivation)
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn update_title(
        &self,
        conversation_id: i64,
        user_id: i64,
        title: &str,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE conversations SET title = $1 WHERE id = $2 AND user_id = $3",
        )
        .bind(title)
        .bind(conversation_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update title: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a conversation and its messages
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the conversation is absent or not owned.
    pub async fn delete(&self, conversation_id: i64, user_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM conversations WHERE id = $1 AND user_id = $2")
            .bind(conversation_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete conversation: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Conversation"));
        }

        Ok(())
    }
}

fn encode_json<T: serde::Serialize>(value: Option<&[T]>) -> AppResult<Option<String>> {
    value
        .map(|v| {
            serde_json::to_string(v)
                .map_err(|e| AppError::internal(format!("Failed to encode tool payload: {e}")))
        })
        .transpose()
}

fn conversation_from_row(row: sqlx::sqlite::SqliteRow) -> Conversation {
    Conversation {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        message_count: row.get("message_count"),
    }
}

fn message_from_row(row: sqlx::sqlite::SqliteRow) -> AppResult<Message> {
    let role: String = row.get("role");
    let tool_calls: Option<String> = row.get("tool_calls");
    let tool_results: Option<String> = row.get("tool_results");

    Ok(Message {
        id: row.get("id"),
        conversation_id: row.get("conversation_id"),
        role: MessageRole::from_str(&role)?,
        content: row.get("content"),
        tool_calls: decode_json(tool_calls.as_deref())?,
        tool_results: decode_json(tool_results.as_deref())?,
        created_at: row.get("created_at"),
    })
}

fn decode_json<T: serde::de::DeserializeOwned>(value: Option<&str>) -> AppResult<Option<T>> {
    value
        .map(|v| {
            serde_json::from_str(v)
                .map_err(|e| AppError::internal(format!("Malformed tool payload in store: {e}")))
        })
        .transpose()
}
