// ABOUTME: Core domain models shared across stores, routes, and the dispatcher
// ABOUTME: User, Task, Conversation, Message, and tool call/result types
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types
//!
//! Timestamps are RFC 3339 strings end to end (the format SQLite stores and
//! the frontend consumes); RFC 3339 sorts lexicographically in time order.

use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

// ============================================================================
// Users
// ============================================================================

/// A registered user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID
    pub id: i64,
    /// Email address, unique across accounts
    pub email: String,
    /// Display name
    pub name: String,
    /// Bcrypt password hash, never serialized to clients
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// When the account was created (RFC 3339)
    pub created_at: String,
}

/// Public view of a user returned by auth endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub email: String,
    pub name: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

// ============================================================================
// Tasks
// ============================================================================

/// Task priority level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl TaskPriority {
    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Parse a stored or client-supplied value, coercing unknown values to
    /// `Medium` (matches the contract's default-on-omission behavior)
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        Self::from_str(s).unwrap_or_default()
    }
}

impl Display for TaskPriority {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(AppError::invalid_input(format!("Invalid priority: {s}"))),
        }
    }
}

/// A task owned by exactly one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task ID
    pub id: i64,
    /// Owning user; never changes after creation
    pub user_id: i64,
    /// Task title
    pub title: String,
    /// Optional free-form description
    pub description: Option<String>,
    /// Completion state
    pub completed: bool,
    /// Priority level
    pub priority: TaskPriority,
    /// When the task was created (RFC 3339)
    pub created_at: String,
    /// When the task was last modified (RFC 3339)
    pub updated_at: String,
}

/// Status filter for task listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl TaskStatusFilter {
    /// Completed-column filter this status maps to, if any
    #[must_use]
    pub const fn completed(&self) -> Option<bool> {
        match self {
            Self::All => None,
            Self::Pending => Some(false),
            Self::Completed => Some(true),
        }
    }
}

impl FromStr for TaskStatusFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            _ => Err(AppError::invalid_input(format!(
                "Invalid status filter: {s} (expected all, pending, or completed)"
            ))),
        }
    }
}

// ============================================================================
// Conversations and Messages
// ============================================================================

/// A chat conversation thread owned by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation ID
    pub id: i64,
    /// Owning user
    pub user_id: i64,
    /// Title, derived from the first user message and stable thereafter
    pub title: String,
    /// When the conversation was created (RFC 3339)
    pub created_at: String,
    /// When a message was last appended (RFC 3339)
    pub updated_at: String,
    /// Number of messages in the conversation
    pub message_count: i64,
}

/// Role of a persisted message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// End-user input
    User,
    /// Model output
    Assistant,
    /// Tool execution results
    Tool,
}

impl MessageRole {
    /// Convert to string for database storage
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

impl FromStr for MessageRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            "tool" => Ok(Self::Tool),
            _ => Err(AppError::invalid_input(format!("Invalid message role: {s}"))),
        }
    }
}

/// An append-only message within a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: i64,
    /// Conversation this message belongs to
    pub conversation_id: i64,
    /// Sender role
    pub role: MessageRole,
    /// Message text (may be empty for tool-result messages)
    pub content: String,
    /// Tool calls the assistant declared in this message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Results of executing those tool calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_results: Option<Vec<ToolResult>>,
    /// When the message was created (RFC 3339); defines replay order
    pub created_at: String,
}

// ============================================================================
// Tool Calls
// ============================================================================

/// A model-declared intent to invoke a named operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Correlation ID; results reference it
    pub id: String,
    /// Registered tool name
    pub name: String,
    /// JSON object of arguments
    pub arguments: serde_json::Value,
}

/// Outcome of executing a [`ToolCall`]
///
/// Failures are carried in the `result` payload as `{"error": "..."}`; a
/// tool failure never aborts the chat turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Correlation ID of the originating call
    pub id: String,
    /// Result payload (or `{"error": ...}` on failure)
    pub result: serde_json::Value,
}

impl ToolResult {
    /// Build a success result correlated to a call
    #[must_use]
    pub fn ok(call: &ToolCall, result: serde_json::Value) -> Self {
        Self {
            id: call.id.clone(),
            result,
        }
    }

    /// Build an error result correlated to a call
    #[must_use]
    pub fn error(call: &ToolCall, message: impl Into<String>) -> Self {
        Self {
            id: call.id.clone(),
            result: serde_json::json!({ "error": message.into() }),
        }
    }

    /// Whether this result carries an error payload
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.result.get("error").is_some()
    }
}

/// Current UTC time as an RFC 3339 string, the canonical timestamp format
#[must_use]
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
