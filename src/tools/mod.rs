// ABOUTME: Task management tool registry and dispatcher for model function calls
// ABOUTME: Executes tool calls against the task store, embedding failures as result payloads
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Tool Dispatcher
//!
//! The model is offered a fixed registry of five task tools. Every call is
//! executed with the authenticated user's id injected server-side; the model
//! never chooses whose tasks it operates on. Execution never surfaces an
//! HTTP error: any failure (bad arguments, unknown tool, missing task) is
//! embedded in the [`ToolResult`] payload as `{"error": ...}` so the model
//! can relay it conversationally.

use crate::database::TaskStore;
use crate::errors::AppError;
use crate::llm::{FunctionDeclaration, Tool};
use crate::models::{TaskPriority, TaskStatusFilter, ToolCall, ToolResult};
use serde_json::{json, Value};
use std::str::FromStr;
use tracing::{debug, warn};

/// Dispatcher executing model-issued tool calls against the task store
pub struct ToolDispatcher {
    tasks: TaskStore,
}

impl ToolDispatcher {
    /// Create a dispatcher over a task store
    #[must_use]
    pub const fn new(tasks: TaskStore) -> Self {
        Self { tasks }
    }

    /// Function declarations advertised to the model
    #[must_use]
    pub fn declarations() -> Vec<Tool> {
        vec![Tool {
            function_declarations: vec![
                FunctionDeclaration {
                    name: "add_task".to_owned(),
                    description:
                        "Create a new task for the user. Use when the user wants to add a new todo item."
                            .to_owned(),
                    parameters: Some(json!({
                        "type": "object",
                        "properties": {
                            "title": {
                                "type": "string",
                                "description": "Task title (required, 1-255 characters)"
                            },
                            "description": {
                                "type": "string",
                                "description": "Task description (optional, max 1000 characters)"
                            },
                            "priority": {
                                "type": "string",
                                "enum": ["low", "medium", "high"],
                                "description": "Task priority (defaults to 'medium' if not specified)"
                            }
                        },
                        "required": ["title"]
                    })),
                },
                FunctionDeclaration {
                    name: "list_tasks".to_owned(),
                    description:
                        "Retrieve tasks from the list. Use when user asks to see, show, or list tasks."
                            .to_owned(),
                    parameters: Some(json!({
                        "type": "object",
                        "properties": {
                            "status": {
                                "type": "string",
                                "enum": ["all", "pending", "completed"],
                                "description": "Filter tasks by status (defaults to 'all')"
                            }
                        },
                        "required": []
                    })),
                },
                FunctionDeclaration {
                    name: "complete_task".to_owned(),
                    description: "Mark a task as complete. Use when user indicates a task is done."
                        .to_owned(),
                    parameters: Some(json!({
                        "type": "object",
                        "properties": {
                            "task_id": {
                                "type": "integer",
                                "description": "The task ID to mark as completed"
                            }
                        },
                        "required": ["task_id"]
                    })),
                },
                FunctionDeclaration {
                    name: "delete_task".to_owned(),
                    description:
                        "Remove a task from the list. Use when user wants to delete/remove/cancel a task."
                            .to_owned(),
                    parameters: Some(json!({
                        "type": "object",
                        "properties": {
                            "task_id": {
                                "type": "integer",
                                "description": "The task ID to delete"
                            }
                        },
                        "required": ["task_id"]
                    })),
                },
                FunctionDeclaration {
                    name: "update_task".to_owned(),
                    description:
                        "Modify task title or description. Use when user wants to change/update/rename a task."
                            .to_owned(),
                    parameters: Some(json!({
                        "type": "object",
                        "properties": {
                            "task_id": {
                                "type": "integer",
                                "description": "The task ID to update"
                            },
                            "title": {
                                "type": "string",
                                "description": "New task title (optional)"
                            },
                            "description": {
                                "type": "string",
                                "description": "New task description (optional)"
                            }
                        },
                        "required": ["task_id"]
                    })),
                },
            ],
        }]
    }

    /// Execute one tool call on behalf of a user
    ///
    /// Always returns a result; failures are carried in the payload.
    pub async fn execute(&self, user_id: i64, call: &ToolCall) -> ToolResult {
        debug!(tool = %call.name, user_id, "executing tool call");

        let outcome = match call.name.as_str() {
            "add_task" => self.add_task(user_id, &call.arguments).await,
            "list_tasks" => self.list_tasks(user_id, &call.arguments).await,
            "complete_task" => self.complete_task(user_id, &call.arguments).await,
            "delete_task" => self.delete_task(user_id, &call.arguments).await,
            "update_task" => self.update_task(user_id, &call.arguments).await,
            other => {
                warn!(tool = %other, "unknown tool requested by model");
                return ToolResult::error(call, format!("Unknown tool: {other}"));
            }
        };

        match outcome {
            Ok(result) => ToolResult::ok(call, result),
            Err(e) => {
                warn!(tool = %call.name, error = %e.message, "tool call failed");
                ToolResult::error(call, e.message)
            }
        }
    }

    async fn add_task(&self, user_id: i64, args: &Value) -> Result<Value, AppError> {
        let title = require_str(args, "title")?;
        let description = optional_str(args, "description");
        let priority = optional_str(args, "priority")
            .map_or(TaskPriority::default(), TaskPriority::from_str_or_default);

        let task = self
            .tasks
            .create(user_id, title, description, priority)
            .await?;

        Ok(json!({
            "success": true,
            "task_id": task.id,
            "status": "created",
            "title": task.title
        }))
    }

    async fn list_tasks(&self, user_id: i64, args: &Value) -> Result<Value, AppError> {
        // Unrecognized status values fall back to "all", matching the
        // tolerant argument handling the model is prompted against
        let filter = optional_str(args, "status")
            .map_or_else(TaskStatusFilter::default, |s| {
                TaskStatusFilter::from_str(s).unwrap_or_default()
            });

        let tasks = self.tasks.list(user_id, filter).await?;
        let task_list: Vec<Value> = tasks
            .iter()
            .map(|t| {
                json!({
                    "id": t.id,
                    "title": t.title,
                    "description": t.description,
                    "completed": t.completed
                })
            })
            .collect();

        Ok(json!({
            "success": true,
            "count": task_list.len(),
            "tasks": task_list
        }))
    }

    async fn complete_task(&self, user_id: i64, args: &Value) -> Result<Value, AppError> {
        let task_id = require_i64(args, "task_id")?;
        let task = self.tasks.set_completed(user_id, task_id, true).await?;

        Ok(json!({
            "success": true,
            "task_id": task.id,
            "status": "completed",
            "title": task.title
        }))
    }

    async fn delete_task(&self, user_id: i64, args: &Value) -> Result<Value, AppError> {
        let task_id = require_i64(args, "task_id")?;
        self.tasks.delete(user_id, task_id).await?;

        Ok(json!({
            "success": true,
            "task_id": task_id,
            "status": "deleted"
        }))
    }

    async fn update_task(&self, user_id: i64, args: &Value) -> Result<Value, AppError> {
        let task_id = require_i64(args, "task_id")?;
        let existing = self
            .tasks
            .get(user_id, task_id)
            .await?
            .ok_or_else(|| AppError::not_found("Task"))?;

        let title = optional_str(args, "title").unwrap_or(&existing.title);
        let description = optional_str(args, "description").or(existing.description.as_deref());

        let task = self
            .tasks
            .replace(
                user_id,
                task_id,
                title,
                description,
                existing.priority,
                existing.completed,
            )
            .await?;

        Ok(json!({
            "success": true,
            "task_id": task.id,
            "status": "updated",
            "title": task.title
        }))
    }
}

fn require_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, AppError> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::invalid_input(format!("{key} is required")))
}

fn optional_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

fn require_i64(args: &Value, key: &str) -> Result<i64, AppError> {
    args.get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| AppError::invalid_input(format!("{key} is required")))
}
