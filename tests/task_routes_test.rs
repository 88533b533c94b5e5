// ABOUTME: Integration tests for the task CRUD routes
// ABOUTME: Covers ownership scoping, validation, toggling, and deletion

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use std::sync::Arc;

use common::{create_test_resources, create_test_user, MockAgent};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};
use taskchat::resources::ServerResources;
use taskchat::routes;

async fn setup() -> (axum::Router, Arc<ServerResources>, i64, String) {
    let resources = create_test_resources(MockAgent::text_only("hi")).await;
    let (user_id, auth) = create_test_user(&resources, "tasks@example.com").await;
    let app = routes::router(resources.clone());
    (app, resources, user_id, auth)
}

async fn create_task(app: &axum::Router, user_id: i64, auth: &str, title: &str) -> Value {
    AxumTestRequest::post(&format!("/api/{user_id}/tasks"))
        .header("authorization", auth)
        .json(&json!({ "title": title }))
        .send(app.clone())
        .await
        .json()
}

#[tokio::test]
async fn create_task_defaults_to_medium_priority() {
    let (app, _resources, user_id, auth) = setup().await;

    let response = AxumTestRequest::post(&format!("/api/{user_id}/tasks"))
        .header("authorization", &auth)
        .json(&json!({ "title": "Buy milk" }))
        .send(app)
        .await;

    assert_eq!(response.status(), 201);
    let task: Value = response.json();
    assert_eq!(task["title"], "Buy milk");
    assert_eq!(task["priority"], "medium");
    assert_eq!(task["completed"], false);
    assert_eq!(task["user_id"], user_id);
}

#[tokio::test]
async fn create_task_coerces_unknown_priority_to_medium() {
    let (app, _resources, user_id, auth) = setup().await;

    let response = AxumTestRequest::post(&format!("/api/{user_id}/tasks"))
        .header("authorization", &auth)
        .json(&json!({ "title": "Urgent thing", "priority": "urgent" }))
        .send(app)
        .await;

    assert_eq!(response.status(), 201);
    let task: Value = response.json();
    assert_eq!(task["priority"], "medium");
}

#[tokio::test]
async fn create_task_rejects_empty_title() {
    let (app, _resources, user_id, auth) = setup().await;

    let response = AxumTestRequest::post(&format!("/api/{user_id}/tasks"))
        .header("authorization", &auth)
        .json(&json!({ "title": "   " }))
        .send(app)
        .await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json();
    assert_eq!(body["detail"], "Title is required");
}

#[tokio::test]
async fn list_tasks_filters_by_status() {
    let (app, _resources, user_id, auth) = setup().await;

    let first = create_task(&app, user_id, &auth, "First").await;
    create_task(&app, user_id, &auth, "Second").await;

    // Complete the first task
    AxumTestRequest::patch(&format!("/api/{user_id}/tasks/{}/complete", first["id"]))
        .header("authorization", &auth)
        .send(app.clone())
        .await;

    let pending: Vec<Value> = AxumTestRequest::get(&format!("/api/{user_id}/tasks?status=pending"))
        .header("authorization", &auth)
        .send(app.clone())
        .await
        .json();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["title"], "Second");

    let completed: Vec<Value> =
        AxumTestRequest::get(&format!("/api/{user_id}/tasks?status=completed"))
            .header("authorization", &auth)
            .send(app.clone())
            .await
            .json();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0]["title"], "First");

    let all: Vec<Value> = AxumTestRequest::get(&format!("/api/{user_id}/tasks"))
        .header("authorization", &auth)
        .send(app)
        .await
        .json();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn list_tasks_rejects_bad_status_filter() {
    let (app, _resources, user_id, auth) = setup().await;

    let response = AxumTestRequest::get(&format!("/api/{user_id}/tasks?status=done"))
        .header("authorization", &auth)
        .send(app)
        .await;

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn toggle_complete_is_self_inverse() {
    let (app, _resources, user_id, auth) = setup().await;
    let task = create_task(&app, user_id, &auth, "Flip me").await;
    let task_id = task["id"].as_i64().unwrap();

    let once: Value = AxumTestRequest::patch(&format!("/api/{user_id}/tasks/{task_id}/complete"))
        .header("authorization", &auth)
        .send(app.clone())
        .await
        .json();
    assert_eq!(once["completed"], true);

    let twice: Value = AxumTestRequest::patch(&format!("/api/{user_id}/tasks/{task_id}/complete"))
        .header("authorization", &auth)
        .send(app)
        .await
        .json();
    assert_eq!(twice["completed"], false);
}

#[tokio::test]
async fn replace_task_is_full_document() {
    let (app, _resources, user_id, auth) = setup().await;
    let task = create_task(&app, user_id, &auth, "Old title").await;
    let task_id = task["id"].as_i64().unwrap();

    let response = AxumTestRequest::put(&format!("/api/{user_id}/tasks/{task_id}"))
        .header("authorization", &auth)
        .json(&json!({
            "title": "New title",
            "priority": "high",
            "completed": true
        }))
        .send(app)
        .await;

    assert_eq!(response.status(), 200);
    let updated: Value = response.json();
    assert_eq!(updated["title"], "New title");
    assert_eq!(updated["priority"], "high");
    assert_eq!(updated["completed"], true);
    assert!(updated["description"].is_null());
}

#[tokio::test]
async fn delete_task_reports_status_and_id() {
    let (app, _resources, user_id, auth) = setup().await;
    let task = create_task(&app, user_id, &auth, "Doomed").await;
    let task_id = task["id"].as_i64().unwrap();

    let response = AxumTestRequest::delete(&format!("/api/{user_id}/tasks/{task_id}"))
        .header("authorization", &auth)
        .send(app.clone())
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "deleted");
    assert_eq!(body["task_id"], task_id);

    let remaining: Vec<Value> = AxumTestRequest::get(&format!("/api/{user_id}/tasks"))
        .header("authorization", &auth)
        .send(app)
        .await
        .json();
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn delete_missing_task_is_not_found() {
    let (app, _resources, user_id, auth) = setup().await;

    let response = AxumTestRequest::delete(&format!("/api/{user_id}/tasks/9999"))
        .header("authorization", &auth)
        .send(app)
        .await;

    assert_eq!(response.status(), 404);
    let body: Value = response.json();
    assert_eq!(body["detail"], "Task not found");
}

#[tokio::test]
async fn path_user_mismatch_is_forbidden() {
    let (app, resources, user_id, auth) = setup().await;
    let (other_id, _other_auth) = create_test_user(&resources, "other@example.com").await;
    assert_ne!(user_id, other_id);

    let response = AxumTestRequest::get(&format!("/api/{other_id}/tasks"))
        .header("authorization", &auth)
        .send(app)
        .await;

    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn foreign_task_reads_as_absent() {
    let (app, resources, user_id, auth) = setup().await;
    let task = create_task(&app, user_id, &auth, "Mine").await;
    let task_id = task["id"].as_i64().unwrap();

    let (other_id, other_auth) = create_test_user(&resources, "intruder@example.com").await;

    // The other user addresses their own path but someone else's task
    let response = AxumTestRequest::delete(&format!("/api/{other_id}/tasks/{task_id}"))
        .header("authorization", &other_auth)
        .send(app)
        .await;

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let (app, _resources, user_id, _auth) = setup().await;

    let response = AxumTestRequest::get(&format!("/api/{user_id}/tasks"))
        .send(app)
        .await;

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let (app, _resources, user_id, _auth) = setup().await;

    let response = AxumTestRequest::get(&format!("/api/{user_id}/tasks"))
        .header("authorization", "Bearer not-a-jwt")
        .send(app)
        .await;

    assert_eq!(response.status(), 401);
}
