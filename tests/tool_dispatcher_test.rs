// ABOUTME: Integration tests for the tool dispatcher against a real store
// ABOUTME: Verifies result payload shapes and error embedding for every tool

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use serde_json::json;
use taskchat::database::Database;
use taskchat::models::ToolCall;
use taskchat::tools::ToolDispatcher;

async fn setup() -> (ToolDispatcher, Database, i64) {
    let database = Database::connect("sqlite::memory:").await.unwrap();
    let user = database
        .users()
        .create("tools@example.com", "Tool Tester", "not-a-real-hash")
        .await
        .unwrap();
    (ToolDispatcher::new(database.tasks()), database, user.id)
}

fn call(name: &str, arguments: serde_json::Value) -> ToolCall {
    ToolCall {
        id: "call_0_0".to_owned(),
        name: name.to_owned(),
        arguments,
    }
}

#[tokio::test]
async fn declarations_cover_the_full_registry() {
    let tools = ToolDispatcher::declarations();
    assert_eq!(tools.len(), 1);

    let names: Vec<&str> = tools[0]
        .function_declarations
        .iter()
        .map(|d| d.name.as_str())
        .collect();

    for expected in [
        "add_task",
        "list_tasks",
        "complete_task",
        "delete_task",
        "update_task",
    ] {
        assert!(names.contains(&expected), "missing declaration {expected}");
    }
}

#[tokio::test]
async fn add_task_reports_created() {
    let (dispatcher, _db, user_id) = setup().await;

    let result = dispatcher
        .execute(user_id, &call("add_task", json!({ "title": "Buy milk" })))
        .await;

    assert!(!result.is_error());
    assert_eq!(result.result["success"], true);
    assert_eq!(result.result["status"], "created");
    assert_eq!(result.result["title"], "Buy milk");
    assert!(result.result["task_id"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn add_task_without_title_embeds_error() {
    let (dispatcher, _db, user_id) = setup().await;

    let result = dispatcher
        .execute(user_id, &call("add_task", json!({})))
        .await;

    assert!(result.is_error());
    assert_eq!(result.result["error"], "title is required");
}

#[tokio::test]
async fn list_tasks_reports_count_and_rows() {
    let (dispatcher, _db, user_id) = setup().await;

    dispatcher
        .execute(user_id, &call("add_task", json!({ "title": "One" })))
        .await;
    dispatcher
        .execute(user_id, &call("add_task", json!({ "title": "Two" })))
        .await;

    let result = dispatcher
        .execute(user_id, &call("list_tasks", json!({})))
        .await;

    assert_eq!(result.result["success"], true);
    assert_eq!(result.result["count"], 2);
    assert_eq!(result.result["tasks"][0]["title"], "One");
    assert_eq!(result.result["tasks"][1]["title"], "Two");
}

#[tokio::test]
async fn list_tasks_honours_status_filter() {
    let (dispatcher, _db, user_id) = setup().await;

    let added = dispatcher
        .execute(user_id, &call("add_task", json!({ "title": "Done soon" })))
        .await;
    let task_id = added.result["task_id"].as_i64().unwrap();
    dispatcher
        .execute(user_id, &call("complete_task", json!({ "task_id": task_id })))
        .await;
    dispatcher
        .execute(user_id, &call("add_task", json!({ "title": "Still open" })))
        .await;

    let pending = dispatcher
        .execute(user_id, &call("list_tasks", json!({ "status": "pending" })))
        .await;
    assert_eq!(pending.result["count"], 1);
    assert_eq!(pending.result["tasks"][0]["title"], "Still open");

    let completed = dispatcher
        .execute(
            user_id,
            &call("list_tasks", json!({ "status": "completed" })),
        )
        .await;
    assert_eq!(completed.result["count"], 1);
    assert_eq!(completed.result["tasks"][0]["title"], "Done soon");
}

#[tokio::test]
async fn complete_task_marks_done_and_is_idempotent() {
    let (dispatcher, db, user_id) = setup().await;

    let added = dispatcher
        .execute(user_id, &call("add_task", json!({ "title": "Finish it" })))
        .await;
    let task_id = added.result["task_id"].as_i64().unwrap();

    let first = dispatcher
        .execute(user_id, &call("complete_task", json!({ "task_id": task_id })))
        .await;
    assert_eq!(first.result["status"], "completed");

    // The tool sets completed rather than toggling it
    let second = dispatcher
        .execute(user_id, &call("complete_task", json!({ "task_id": task_id })))
        .await;
    assert_eq!(second.result["status"], "completed");

    let task = db.tasks().get(user_id, task_id).await.unwrap().unwrap();
    assert!(task.completed);
}

#[tokio::test]
async fn update_task_keeps_unspecified_fields() {
    let (dispatcher, db, user_id) = setup().await;

    let added = dispatcher
        .execute(
            user_id,
            &call(
                "add_task",
                json!({ "title": "Old", "description": "keep me", "priority": "high" }),
            ),
        )
        .await;
    let task_id = added.result["task_id"].as_i64().unwrap();

    let result = dispatcher
        .execute(
            user_id,
            &call("update_task", json!({ "task_id": task_id, "title": "New" })),
        )
        .await;
    assert_eq!(result.result["status"], "updated");
    assert_eq!(result.result["title"], "New");

    let task = db.tasks().get(user_id, task_id).await.unwrap().unwrap();
    assert_eq!(task.description.as_deref(), Some("keep me"));
    assert_eq!(task.priority.as_str(), "high");
}

#[tokio::test]
async fn delete_task_reports_deleted() {
    let (dispatcher, db, user_id) = setup().await;

    let added = dispatcher
        .execute(user_id, &call("add_task", json!({ "title": "Temp" })))
        .await;
    let task_id = added.result["task_id"].as_i64().unwrap();

    let result = dispatcher
        .execute(user_id, &call("delete_task", json!({ "task_id": task_id })))
        .await;
    assert_eq!(result.result["status"], "deleted");
    assert_eq!(result.result["task_id"], task_id);

    assert!(db.tasks().get(user_id, task_id).await.unwrap().is_none());
}

#[tokio::test]
async fn missing_task_embeds_not_found() {
    let (dispatcher, _db, user_id) = setup().await;

    let result = dispatcher
        .execute(user_id, &call("delete_task", json!({ "task_id": 9999 })))
        .await;

    assert!(result.is_error());
    assert_eq!(result.result["error"], "Task not found");
}

#[tokio::test]
async fn unknown_tool_embeds_error() {
    let (dispatcher, _db, user_id) = setup().await;

    let result = dispatcher
        .execute(user_id, &call("launch_rocket", json!({})))
        .await;

    assert!(result.is_error());
    assert_eq!(result.result["error"], "Unknown tool: launch_rocket");
    assert_eq!(result.id, "call_0_0");
}

#[tokio::test]
async fn tools_are_scoped_to_the_calling_user() {
    let (dispatcher, db, user_id) = setup().await;

    let other = db
        .users()
        .create("other-tools@example.com", "Other", "not-a-real-hash")
        .await
        .unwrap();

    dispatcher
        .execute(user_id, &call("add_task", json!({ "title": "Private" })))
        .await;

    let listed = dispatcher
        .execute(other.id, &call("list_tasks", json!({})))
        .await;
    assert_eq!(listed.result["count"], 0);
}
