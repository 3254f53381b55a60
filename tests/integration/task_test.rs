//! Integration tests for task CRUD and the notifications it triggers.

mod helpers;

use std::time::Duration;

use http::StatusCode;
use serde_json::json;

use helpers::{TestApp, assert_no_event, next_event};

#[tokio::test]
async fn test_create_and_get_task() {
    let app = TestApp::new().await;
    let user = app.signup("Ada", "ada@example.com").await;

    let task = app.create_task(&user, "  Buy milk ").await;
    assert_eq!(task["title"], "Buy milk");
    assert_eq!(task["completed"], false);
    assert_eq!(task["owner"], user.id.as_str());

    let id = task["id"].as_str().unwrap();
    let fetched = app
        .request("GET", &format!("/api/tasks/{id}"), None, Some(&user.token))
        .await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["title"], "Buy milk");
}

#[tokio::test]
async fn test_title_required() {
    let app = TestApp::new().await;
    let user = app.signup("Ada", "ada@example.com").await;

    let response = app
        .request(
            "POST",
            "/api/tasks",
            Some(json!({ "title": "" })),
            Some(&user.token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_filters_by_completion() {
    let app = TestApp::new().await;
    let user = app.signup("Ada", "ada@example.com").await;
    app.create_task(&user, "open").await;
    let done = app
        .request(
            "POST",
            "/api/tasks",
            Some(json!({ "title": "done", "completed": true })),
            Some(&user.token),
        )
        .await;
    assert_eq!(done.status, StatusCode::CREATED);

    let open = app
        .request("GET", "/api/tasks", None, Some(&user.token))
        .await;
    let titles: Vec<&str> = open
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["open"]);

    let completed = app
        .request("GET", "/api/tasks?completed=true", None, Some(&user.token))
        .await;
    assert_eq!(completed.body.as_array().unwrap().len(), 1);
    assert_eq!(completed.body[0]["title"], "done");
}

#[tokio::test]
async fn test_update_rejects_disallowed_fields() {
    let app = TestApp::new().await;
    let user = app.signup("Ada", "ada@example.com").await;
    let task = app.create_task(&user, "Buy milk").await;
    let id = task["id"].as_str().unwrap();

    let rejected = app
        .request(
            "PATCH",
            &format!("/api/tasks/{id}"),
            Some(json!({ "created_at": "2020-01-01T00:00:00Z" })),
            Some(&user.token),
        )
        .await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
    assert_eq!(rejected.body["error"], "Invalid updates!");

    let updated = app
        .request(
            "PATCH",
            &format!("/api/tasks/{id}"),
            Some(json!({ "completed": true })),
            Some(&user.token),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["completed"], true);
    assert_eq!(updated.body["created_at"], task["created_at"]);
}

#[tokio::test]
async fn test_tasks_are_owner_scoped() {
    let app = TestApp::new().await;
    let owner = app.signup("Ada", "ada@example.com").await;
    let intruder = app.signup("Eve", "eve@example.com").await;
    let task = app.create_task(&owner, "Secret").await;
    let id = task["id"].as_str().unwrap();

    for method in ["GET", "PATCH", "DELETE"] {
        let body = (method == "PATCH").then(|| json!({ "title": "pwned" }));
        let response = app
            .request(method, &format!("/api/tasks/{id}"), body, Some(&intruder.token))
            .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{method}");
        assert_eq!(response.body["error"], "Task not found");
    }
}

#[tokio::test]
async fn test_task_mutations_notify_owner() {
    let app = TestApp::spawn().await;
    let user = app.signup("Ada", "ada@example.com").await;
    let (mut ws, _) = app.connect_ws(&user.token).await;

    let task = app.create_task(&user, "Buy milk").await;
    let created = next_event(&mut ws).await;
    assert_eq!(created["event"], "notification");
    assert_eq!(created["data"]["message"], "Added New Task: Buy milk");
    assert!(created["data"]["timestamp"].is_string());

    let id = task["id"].as_str().unwrap();
    app.request(
        "PATCH",
        &format!("/api/tasks/{id}"),
        Some(json!({ "title": "Buy oat milk" })),
        Some(&user.token),
    )
    .await;
    let updated = next_event(&mut ws).await;
    assert_eq!(updated["data"]["message"], "Updated Task: Buy oat milk");
}

#[tokio::test]
async fn test_delete_notifies_only_the_owner() {
    let app = TestApp::spawn().await;
    let u1 = app.signup("Ada", "ada@example.com").await;
    let u2 = app.signup("Grace", "grace@example.com").await;
    let task = app.create_task(&u1, "Buy milk").await;

    let (mut ws1, _) = app.connect_ws(&u1.token).await;
    let (mut ws2, _) = app.connect_ws(&u2.token).await;

    let id = task["id"].as_str().unwrap();
    let deleted = app
        .request("DELETE", &format!("/api/tasks/{id}"), None, Some(&u1.token))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["title"], "Buy milk");

    let event = next_event(&mut ws1).await;
    assert_eq!(event["event"], "notification");
    assert_eq!(event["data"]["message"], "Deleted Task: Buy milk");

    assert_no_event(&mut ws1, Duration::from_millis(200)).await;
    assert_no_event(&mut ws2, Duration::from_millis(200)).await;
}

#[tokio::test]
async fn test_failed_mutation_sends_nothing() {
    let app = TestApp::spawn().await;
    let user = app.signup("Ada", "ada@example.com").await;
    let (mut ws, _) = app.connect_ws(&user.token).await;

    let missing = app
        .request(
            "DELETE",
            &format!("/api/tasks/{}", uuid::Uuid::new_v4()),
            None,
            Some(&user.token),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_no_event(&mut ws, Duration::from_millis(200)).await;
}

#[tokio::test]
async fn test_mutations_succeed_after_realtime_shutdown() {
    let app = TestApp::new().await;
    let user = app.signup("Ada", "ada@example.com").await;
    let task = app.create_task(&user, "Buy milk").await;
    let id = task["id"].as_str().unwrap();

    app.state.realtime.shutdown();

    let updated = app
        .request(
            "PATCH",
            &format!("/api/tasks/{id}"),
            Some(json!({ "completed": true })),
            Some(&user.token),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["completed"], true);

    let deleted = app
        .request("DELETE", &format!("/api/tasks/{id}"), None, Some(&user.token))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["title"], "Buy milk");

    let created = app.create_task(&user, "Walk dog").await;
    assert_eq!(created["title"], "Walk dog");
}

#[tokio::test]
async fn test_title_length_counts_trimmed_text() {
    let app = TestApp::new().await;
    let user = app.signup("Ada", "ada@example.com").await;

    let padded = format!("  {}  ", "a".repeat(100));
    let task = app.create_task(&user, &padded).await;
    assert_eq!(task["title"].as_str().unwrap().len(), 100);

    let too_long = app
        .request(
            "POST",
            "/api/tasks",
            Some(json!({ "title": "a".repeat(101) })),
            Some(&user.token),
        )
        .await;
    assert_eq!(too_long.status, StatusCode::BAD_REQUEST);

    let id = task["id"].as_str().unwrap();
    let renamed = app
        .request(
            "PATCH",
            &format!("/api/tasks/{id}"),
            Some(json!({ "title": format!(" {} ", "b".repeat(100)) })),
            Some(&user.token),
        )
        .await;
    assert_eq!(renamed.status, StatusCode::OK);
}
