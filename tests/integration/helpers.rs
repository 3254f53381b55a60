//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use futures::StreamExt;
use http::{HeaderMap, Request, StatusCode};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tower::ServiceExt;

use taskhub_api::{AppState, build_app, build_state};
use taskhub_core::config::AppConfig;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "correct horse battery";

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for inspecting the real-time engine
    pub state: AppState,
    /// Application config
    pub config: AppConfig,
    /// Address of the live server, once spawned
    pub addr: Option<SocketAddr>,
}

/// Response captured from the router
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// A signed-up user
pub struct TestUser {
    pub id: String,
    pub email: String,
    pub token: String,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database.provider = "memory".to_string();
    config.auth.jwt_secret = TEST_SECRET.to_string();
    config
}

impl TestApp {
    /// Create a new test application backed by the in-memory store
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// Create a test application from a customised config
    pub async fn with_config(config: AppConfig) -> Self {
        let state = build_state(config.clone())
            .await
            .expect("Failed to build state");
        let router = build_app(state.clone());

        Self {
            router,
            state,
            config,
            addr: None,
        }
    }

    /// Create a test application serving on an ephemeral port
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config()).await
    }

    /// Serve a customised config on an ephemeral port
    pub async fn spawn_with(config: AppConfig) -> Self {
        let mut app = Self::with_config(config).await;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        app.addr = Some(listener.local_addr().expect("No local addr"));

        let router = app.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server failed");
        });
        app
    }

    /// Send a request through the router
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Make a JSON request with an optional bearer token
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        self.send(req.body(Body::from(body_str)).expect("Failed to build request"))
            .await
    }

    /// Sign up a user and return its ID and token
    pub async fn signup(&self, name: &str, email: &str) -> TestUser {
        let response = self
            .request(
                "POST",
                "/api/users/signup",
                Some(json!({ "name": name, "email": email, "password": PASSWORD })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);

        TestUser {
            id: response.body["user"]["id"]
                .as_str()
                .expect("user id")
                .to_string(),
            email: email.to_string(),
            token: response.body["token"]
                .as_str()
                .expect("token")
                .to_string(),
        }
    }

    /// Create a task for the user and return the response body
    pub async fn create_task(&self, user: &TestUser, title: &str) -> Value {
        let response = self
            .request(
                "POST",
                "/api/tasks",
                Some(json!({ "title": title })),
                Some(&user.token),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body
    }

    /// WebSocket URL with an optional token query parameter
    pub fn ws_url(&self, token: Option<&str>) -> String {
        let addr = self.addr.expect("Server not spawned");
        match token {
            Some(token) => format!("ws://{addr}/ws?token={token}"),
            None => format!("ws://{addr}/ws"),
        }
    }

    /// Open a WebSocket and wait for the `connected` event
    pub async fn connect_ws(&self, token: &str) -> (WsClient, Value) {
        let (mut ws, _) = connect_async(self.ws_url(Some(token)))
            .await
            .expect("WebSocket handshake failed");
        let connected = next_event(&mut ws).await;
        assert_eq!(connected["event"], "connected");
        (ws, connected)
    }

    /// Number of users with a registered connection
    pub fn registered(&self) -> usize {
        self.state.realtime.registry.len()
    }

    /// Poll until the registry holds `expected` users
    pub async fn wait_for_registered(&self, expected: usize) {
        self.wait_for_registered_within(expected, Duration::from_secs(2))
            .await;
    }

    /// Poll until the registry holds `expected` users, up to `limit`
    pub async fn wait_for_registered_within(&self, expected: usize, limit: Duration) {
        let polls = (limit.as_millis() / 20).max(1);
        for _ in 0..polls {
            if self.registered() == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!(
            "registry size stayed at {} (expected {expected})",
            self.registered()
        );
    }
}

/// Next JSON event from the server, skipping control frames
pub async fn next_event(ws: &mut WsClient) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("Timed out waiting for event")
            .expect("Stream ended")
            .expect("WebSocket error");
        match frame {
            Message::Text(text) => {
                return serde_json::from_str(text.as_str()).expect("Invalid JSON event");
            }
            Message::Close(_) => panic!("Connection closed while waiting for event"),
            _ => continue,
        }
    }
}

/// Assert that no JSON event arrives within `wait`
pub async fn assert_no_event(ws: &mut WsClient, wait: Duration) {
    let deadline = tokio::time::Instant::now() + wait;
    loop {
        match tokio::time::timeout_at(deadline, ws.next()).await {
            Err(_) => return,
            Ok(Some(Ok(Message::Text(text)))) => panic!("Unexpected event: {}", text.as_str()),
            Ok(Some(Ok(_))) => continue,
            Ok(_) => return,
        }
    }
}
