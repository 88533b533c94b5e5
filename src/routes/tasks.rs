// ABOUTME: Task CRUD route handlers scoped to the authenticated user
// ABOUTME: Path user_id must match the token subject; mismatch is a 403
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, patch, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::ensure_path_user;
use crate::errors::AppResult;
use crate::models::{Task, TaskPriority, TaskStatusFilter};
use crate::resources::ServerResources;

// ============================================================================
// Request Types
// ============================================================================

/// Task creation request
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// Task title (required)
    pub title: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Optional priority; unrecognized values coerce to medium
    #[serde(default)]
    pub priority: Option<String>,
}

/// Full-document task replacement
///
/// PUT semantics: omitted fields reset to their defaults rather than
/// keeping their current values.
#[derive(Debug, Deserialize)]
pub struct ReplaceTaskRequest {
    /// New title (required)
    pub title: String,
    /// New description (omission clears it)
    #[serde(default)]
    pub description: Option<String>,
    /// New priority (omission resets to medium)
    #[serde(default)]
    pub priority: Option<String>,
    /// New completion state (omission resets to pending)
    #[serde(default)]
    pub completed: bool,
}

/// Status filter query parameters
#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    /// all | pending | completed
    #[serde(default)]
    pub status: Option<String>,
}

// ============================================================================
// Task Routes
// ============================================================================

/// Task routes handler
pub struct TaskRoutes;

impl TaskRoutes {
    /// Create all task routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/:user_id/tasks",
                get(Self::list_tasks).post(Self::create_task),
            )
            .route(
                "/api/:user_id/tasks/:task_id",
                put(Self::replace_task).delete(Self::delete_task),
            )
            .route(
                "/api/:user_id/tasks/:task_id/complete",
                patch(Self::toggle_complete),
            )
            .with_state(resources)
    }

    /// List the user's tasks, optionally filtered by status
    async fn list_tasks(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<i64>,
        Query(query): Query<ListTasksQuery>,
        headers: HeaderMap,
    ) -> AppResult<Json<Vec<Task>>> {
        let auth_user_id = resources.auth.authenticate(&headers)?;
        ensure_path_user(user_id, auth_user_id)?;

        let filter = query
            .status
            .as_deref()
            .map(TaskStatusFilter::from_str)
            .transpose()?
            .unwrap_or_default();

        let tasks = resources.database.tasks().list(auth_user_id, filter).await?;
        Ok(Json(tasks))
    }

    /// Create a task
    async fn create_task(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<i64>,
        headers: HeaderMap,
        Json(request): Json<CreateTaskRequest>,
    ) -> AppResult<(StatusCode, Json<Task>)> {
        let auth_user_id = resources.auth.authenticate(&headers)?;
        ensure_path_user(user_id, auth_user_id)?;

        let priority = request
            .priority
            .as_deref()
            .map_or_else(TaskPriority::default, TaskPriority::from_str_or_default);

        let task = resources
            .database
            .tasks()
            .create(
                auth_user_id,
                &request.title,
                request.description.as_deref(),
                priority,
            )
            .await?;

        info!(task_id = task.id, user_id = auth_user_id, "task created");
        Ok((StatusCode::CREATED, Json(task)))
    }

    /// Replace a task (full-document update)
    async fn replace_task(
        State(resources): State<Arc<ServerResources>>,
        Path((user_id, task_id)): Path<(i64, i64)>,
        headers: HeaderMap,
        Json(request): Json<ReplaceTaskRequest>,
    ) -> AppResult<Json<Task>> {
        let auth_user_id = resources.auth.authenticate(&headers)?;
        ensure_path_user(user_id, auth_user_id)?;

        let priority = request
            .priority
            .as_deref()
            .map_or_else(TaskPriority::default, TaskPriority::from_str_or_default);

        let task = resources
            .database
            .tasks()
            .replace(
                auth_user_id,
                task_id,
                &request.title,
                request.description.as_deref(),
                priority,
                request.completed,
            )
            .await?;

        Ok(Json(task))
    }

    /// Toggle a task's completion state
    ///
    /// Non-idempotent: every call flips the state.
    async fn toggle_complete(
        State(resources): State<Arc<ServerResources>>,
        Path((user_id, task_id)): Path<(i64, i64)>,
        headers: HeaderMap,
    ) -> AppResult<Json<Task>> {
        let auth_user_id = resources.auth.authenticate(&headers)?;
        ensure_path_user(user_id, auth_user_id)?;

        let task = resources
            .database
            .tasks()
            .toggle_complete(auth_user_id, task_id)
            .await?;

        Ok(Json(task))
    }

    /// Delete a task
    async fn delete_task(
        State(resources): State<Arc<ServerResources>>,
        Path((user_id, task_id)): Path<(i64, i64)>,
        headers: HeaderMap,
    ) -> AppResult<Json<serde_json::Value>> {
        let auth_user_id = resources.auth.authenticate(&headers)?;
        ensure_path_user(user_id, auth_user_id)?;

        resources
            .database
            .tasks()
            .delete(auth_user_id, task_id)
            .await?;

        info!(task_id, user_id = auth_user_id, "task deleted");
        Ok(Json(json!({ "status": "deleted", "task_id": task_id })))
    }
}
