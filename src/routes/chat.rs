// ABOUTME: Chat and conversation route handlers
// ABOUTME: Stateless chat endpoint plus conversation listing, replay, and deletion
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::ensure_path_user;
use crate::errors::{AppError, AppResult};
use crate::models::{Conversation, Message, ToolCall};
use crate::resources::ServerResources;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Chat turn request
#[derive(Debug, Deserialize)]
pub struct ChatTurnRequest {
    /// User message text
    pub message: String,
    /// Existing conversation to continue; omitted to start a new one
    #[serde(default)]
    pub conversation_id: Option<i64>,
}

/// Chat turn response
#[derive(Debug, Serialize)]
pub struct ChatTurnResponse {
    /// Final assistant text
    pub response: String,
    /// Conversation the turn was recorded in
    pub conversation_id: i64,
    /// Id of the final assistant message
    pub message_id: i64,
    /// Tool calls executed during the turn
    pub tool_calls: Vec<ToolCall>,
}

// ============================================================================
// Chat Routes
// ============================================================================

/// Chat routes handler
pub struct ChatRoutes;

impl ChatRoutes {
    /// Create all chat routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/:user_id/chat", post(Self::chat))
            .route("/api/:user_id/conversations", get(Self::list_conversations))
            .route(
                "/api/:user_id/conversations/:conversation_id",
                get(Self::get_messages).delete(Self::delete_conversation),
            )
            .with_state(resources)
    }

    /// Process one chat turn
    ///
    /// The endpoint is stateless: each request carries the message and an
    /// optional conversation id, and the full transcript is replayed from
    /// the store before the model runs.
    async fn chat(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<i64>,
        headers: HeaderMap,
        Json(request): Json<ChatTurnRequest>,
    ) -> AppResult<Json<ChatTurnResponse>> {
        let auth_user_id = resources.auth.authenticate(&headers)?;
        ensure_path_user(user_id, auth_user_id)?;

        let message = request.message.trim();
        if message.is_empty() {
            return Err(AppError::invalid_input("Message cannot be empty"));
        }

        let outcome = resources
            .orchestrator
            .process_message(auth_user_id, request.conversation_id, message)
            .await?;

        info!(
            conversation_id = outcome.conversation_id,
            user_id = auth_user_id,
            tool_calls = outcome.tool_calls.len(),
            "chat turn completed"
        );

        Ok(Json(ChatTurnResponse {
            response: outcome.response,
            conversation_id: outcome.conversation_id,
            message_id: outcome.message_id,
            tool_calls: outcome.tool_calls,
        }))
    }

    /// List the user's conversations, most recently updated first
    async fn list_conversations(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<i64>,
        headers: HeaderMap,
    ) -> AppResult<Json<Vec<Conversation>>> {
        let auth_user_id = resources.auth.authenticate(&headers)?;
        ensure_path_user(user_id, auth_user_id)?;

        let conversations = resources
            .database
            .conversations()
            .list_for_user(auth_user_id)
            .await?;

        Ok(Json(conversations))
    }

    /// Replay a conversation's messages in order
    async fn get_messages(
        State(resources): State<Arc<ServerResources>>,
        Path((user_id, conversation_id)): Path<(i64, i64)>,
        headers: HeaderMap,
    ) -> AppResult<Json<Vec<Message>>> {
        let auth_user_id = resources.auth.authenticate(&headers)?;
        ensure_path_user(user_id, auth_user_id)?;

        let messages = resources
            .database
            .conversations()
            .messages(conversation_id, auth_user_id)
            .await?;

        Ok(Json(messages))
    }

    /// Delete a conversation and all its messages
    async fn delete_conversation(
        State(resources): State<Arc<ServerResources>>,
        Path((user_id, conversation_id)): Path<(i64, i64)>,
        headers: HeaderMap,
    ) -> AppResult<Json<serde_json::Value>> {
        let auth_user_id = resources.auth.authenticate(&headers)?;
        ensure_path_user(user_id, auth_user_id)?;

        resources
            .database
            .conversations()
            .delete(conversation_id, auth_user_id)
            .await?;

        info!(conversation_id, user_id = auth_user_id, "conversation deleted");
        Ok(Json(json!({ "message": "Conversation deleted successfully" })))
    }
}
