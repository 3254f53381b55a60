//! Integration tests for accounts, sessions and cookie authentication.

mod helpers;

use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::json;

use helpers::{PASSWORD, TestApp};

#[tokio::test]
async fn test_signup_hides_password_hash() {
    let app = TestApp::new().await;
    let response = app
        .request(
            "POST",
            "/api/users/signup",
            Some(json!({ "name": "Ada", "email": " Ada@Example.com ", "password": PASSWORD })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["user"]["email"], "ada@example.com");
    assert!(response.body["user"].get("password_hash").is_none());
    assert!(response.body["token"].is_string());
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let app = TestApp::new().await;
    app.signup("Ada", "ada@example.com").await;

    let response = app
        .request(
            "POST",
            "/api/users/signup",
            Some(json!({ "name": "Other", "email": "ADA@example.com", "password": PASSWORD })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Email already in use");
}

#[tokio::test]
async fn test_signup_validation() {
    let app = TestApp::new().await;
    let short_password = app
        .request(
            "POST",
            "/api/users/signup",
            Some(json!({ "name": "Ada", "email": "ada@example.com", "password": "short" })),
            None,
        )
        .await;
    assert_eq!(short_password.status, StatusCode::BAD_REQUEST);

    let bad_email = app
        .request(
            "POST",
            "/api/users/signup",
            Some(json!({ "name": "Ada", "email": "nope", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_email.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_login_sets_cookie_usable_for_requests() {
    let app = TestApp::new().await;
    app.signup("Ada", "ada@example.com").await;

    let response = app
        .request(
            "POST",
            "/api/users/login",
            Some(json!({ "email": "ada@example.com", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let set_cookie = response
        .headers
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .expect("login must set a cookie")
        .to_string();
    assert!(set_cookie.starts_with("token="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));

    let cookie = set_cookie.split(';').next().unwrap().to_string();
    let me = app
        .send(
            Request::builder()
                .uri("/api/users/me")
                .header("Cookie", cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["email"], "ada@example.com");
}

#[tokio::test]
async fn test_bad_credentials() {
    let app = TestApp::new().await;
    app.signup("Ada", "ada@example.com").await;

    let response = app
        .request(
            "POST",
            "/api/users/login",
            Some(json!({ "email": "ada@example.com", "password": "wrong password" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Invalid login credentials");
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let app = TestApp::new().await;
    let user = app.signup("Ada", "ada@example.com").await;

    let response = app
        .request("POST", "/api/users/logout", None, Some(&user.token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Logged out successfully");

    let me = app
        .request("GET", "/api/users/me", None, Some(&user.token))
        .await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
    assert_eq!(me.body["error"], "Please authenticate.");
}

#[tokio::test]
async fn test_missing_token_rejected() {
    let app = TestApp::new().await;
    let me = app.request("GET", "/api/users/me", None, None).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
    assert_eq!(me.body["error"], "Please authenticate.");
}

#[tokio::test]
async fn test_profile_update_rejects_unknown_fields() {
    let app = TestApp::new().await;
    let user = app.signup("Ada", "ada@example.com").await;

    let rejected = app
        .request(
            "PATCH",
            "/api/users/me",
            Some(json!({ "id": "someone-else" })),
            Some(&user.token),
        )
        .await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
    assert_eq!(rejected.body["error"], "Invalid updates!");

    let updated = app
        .request(
            "PATCH",
            "/api/users/me",
            Some(json!({ "name": "Grace" })),
            Some(&user.token),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["name"], "Grace");
}

#[tokio::test]
async fn test_delete_account_removes_tasks() {
    let app = TestApp::new().await;
    let user = app.signup("Ada", "ada@example.com").await;
    app.create_task(&user, "Buy milk").await;

    let deleted = app
        .request("DELETE", "/api/users/me", None, Some(&user.token))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let tasks = app
        .request("GET", "/api/tasks", None, Some(&user.token))
        .await;
    assert_eq!(tasks.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/api/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");

    let detailed = app.request("GET", "/api/health/detailed", None, None).await;
    assert_eq!(detailed.status, StatusCode::OK);
    assert_eq!(detailed.body["database"], "connected");
    assert_eq!(detailed.body["realtime"]["started"], true);
    assert_eq!(detailed.body["realtime"]["connections"], 0);
}
