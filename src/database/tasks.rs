// ABOUTME: Task store: CRUD and completion toggling scoped to the owning user
// ABOUTME: Every statement filters on user_id so cross-user access is structurally impossible
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Task persistence
//!
//! All operations take the requesting `user_id` and scope every WHERE clause
//! to it; an absent task and another user's task are indistinguishable to the
//! caller. Mutations are single atomic statements so a UI toggle and a
//! tool-driven completion cannot interleave into an inconsistent row.

use crate::errors::{AppError, AppResult};
use crate::models::{now_rfc3339, Task, TaskPriority, TaskStatusFilter};
use sqlx::{Row, SqlitePool};

/// Maximum accepted title length, matching the original contract
const MAX_TITLE_LEN: usize = 255;

/// Maximum accepted description length
const MAX_DESCRIPTION_LEN: usize = 1000;

/// Task store handle
pub struct TaskStore {
    pool: SqlitePool,
}

impl TaskStore {
    /// Create a new task store
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Validate a task title
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the title is empty (after trimming) or
    /// exceeds the length limit.
    pub fn validate_title(title: &str) -> AppResult<()> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("Title is required"));
        }
        if trimmed.len() > MAX_TITLE_LEN {
            return Err(AppError::invalid_input(format!(
                "Title must be 1-{MAX_TITLE_LEN} characters"
            )));
        }
        Ok(())
    }

    /// Validate an optional description
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the description exceeds the length limit.
    pub fn validate_description(description: Option<&str>) -> AppResult<()> {
        if let Some(d) = description {
            if d.len() > MAX_DESCRIPTION_LEN {
                return Err(AppError::invalid_input(format!(
                    "Description must be at most {MAX_DESCRIPTION_LEN} characters"
                )));
            }
        }
        Ok(())
    }

    /// List a user's tasks in creation order, optionally filtered by status
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list(&self, user_id: i64, filter: TaskStatusFilter) -> AppResult<Vec<Task>> {
        let rows = match filter.completed() {
            Some(completed) => {
                sqlx::query(
                    r"
                    SELECT id, user_id, title, description, completed, priority, created_at, updated_at
                    FROM tasks
                    WHERE user_id = $1 AND completed = $2
                    ORDER BY id ASC
                    ",
                )
                .bind(user_id)
                .bind(completed)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r"
                    SELECT id, user_id, title, description, completed, priority, created_at, updated_at
                    FROM tasks
                    WHERE user_id = $1
                    ORDER BY id ASC
                    ",
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| AppError::database(format!("Failed to list tasks: {e}")))?;

        Ok(rows.into_iter().map(task_from_row).collect())
    }

    /// Fetch one task owned by the user
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get(&self, user_id: i64, task_id: i64) -> AppResult<Option<Task>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, title, description, completed, priority, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(task_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get task: {e}")))?;

        Ok(row.map(task_from_row))
    }

    /// Create a new task
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for a missing/overlong title and database
    /// errors otherwise.
    pub async fn create(
        &self,
        user_id: i64,
        title: &str,
        description: Option<&str>,
        priority: TaskPriority,
    ) -> AppResult<Task> {
        Self::validate_title(title)?;
        Self::validate_description(description)?;
        let title = title.trim();
        let now = now_rfc3339();

        let result = sqlx::query(
            r"
            INSERT INTO tasks (user_id, title, description, completed, priority, created_at, updated_at)
            VALUES ($1, $2, $3, 0, $4, $5, $5)
            ",
        )
        .bind(user_id)
        .bind(title)
        .bind(description)
        .bind(priority.as_str())
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create task: {e}")))?;

        Ok(Task {
            id: result.last_insert_rowid(),
            user_id,
            title: title.to_owned(),
            description: description.map(ToOwned::to_owned),
            completed: false,
            priority,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Full-document replace of a task
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the task is absent or not owned by the user,
    /// `InvalidInput` for a bad title.
    pub async fn replace(
        &self,
        user_id: i64,
        task_id: i64,
        title: &str,
        description: Option<&str>,
        priority: TaskPriority,
        completed: bool,
    ) -> AppResult<Task> {
        Self::validate_title(title)?;
        Self::validate_description(description)?;
        let now = now_rfc3339();

        let result = sqlx::query(
            r"
            UPDATE tasks
            SET title = $1, description = $2, priority = $3, completed = $4, updated_at = $5
            WHERE id = $6 AND user_id = $7
            ",
        )
        .bind(title.trim())
        .bind(description)
        .bind(priority.as_str())
        .bind(completed)
        .bind(&now)
        .bind(task_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update task: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Task"));
        }

        self.get(user_id, task_id)
            .await?
            .ok_or_else(|| AppError::not_found("Task"))
    }

    /// Flip a task's completion state in a single atomic statement
    ///
    /// Deliberately non-idempotent: each call flips the state. Callers that
    /// need idempotence must read first and decide.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the task is absent or not owned by the user.
    pub async fn toggle_complete(&self, user_id: i64, task_id: i64) -> AppResult<Task> {
        let now = now_rfc3339();

        let result = sqlx::query(
            r"
            UPDATE tasks
            SET completed = 1 - completed, updated_at = $1
            WHERE id = $2 AND user_id = $3
            ",
        )
        .bind(&now)
        .bind(task_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to toggle task: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Task"));
        }

        self.get(user_id, task_id)
            .await?
            .ok_or_else(|| AppError::not_found("Task"))
    }

    /// Mark a task complete (used by the `complete_task` tool, which is
    /// "mark done", not "flip")
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the task is absent or not owned by the user.
    pub async fn set_completed(
        &self,
        user_id: i64,
        task_id: i64,
        completed: bool,
    ) -> AppResult<Task> {
        let now = now_rfc3339();

        let result = sqlx::query(
            r"
            UPDATE tasks
            SET completed = $1, updated_at = $2
            WHERE id = $3 AND user_id = $4
            ",
        )
        .bind(completed)
        .bind(&now)
        .bind(task_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to complete task: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Task"));
        }

        self.get(user_id, task_id)
            .await?
            .ok_or_else(|| AppError::not_found("Task"))
    }

    /// Delete a task
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the task is absent or not owned by the user.
    pub async fn delete(&self, user_id: i64, task_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(task_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete task: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Task"));
        }

        Ok(())
    }
}

fn task_from_row(row: sqlx::sqlite::SqliteRow) -> Task {
    let priority: String = row.get("priority");
    Task {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        description: row.get("description"),
        completed: row.get("completed"),
        priority: TaskPriority::from_str_or_default(&priority),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
