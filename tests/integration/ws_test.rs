//! Integration tests for the WebSocket handshake, registry and dispatch.

mod helpers;

use std::time::Duration;

use chrono::Utc;
use futures::{SinkExt, StreamExt};
use http::StatusCode;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use uuid::Uuid;

use taskhub_auth::jwt::{Claims, JwtEncoder};
use taskhub_core::config::AuthConfig;
use taskhub_core::types::id::UserId;
use taskhub_realtime::message::OutboundMessage;

use helpers::{TEST_SECRET, TestApp, assert_no_event, next_event, test_config};

async fn expect_rejected(app: &TestApp, url: String, expected: StatusCode) {
    match connect_async(url).await {
        Err(WsError::Http(response)) => assert_eq!(response.status(), expected),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("handshake unexpectedly accepted"),
    }
}

fn encoder(secret: &str) -> JwtEncoder {
    JwtEncoder::new(&AuthConfig {
        jwt_secret: secret.to_string(),
        ..AuthConfig::default()
    })
}

#[tokio::test]
async fn test_handshake_without_token_rejected() {
    let app = TestApp::spawn().await;
    expect_rejected(&app, app.ws_url(None), StatusCode::UNAUTHORIZED).await;
    assert_eq!(app.registered(), 0);
}

#[tokio::test]
async fn test_handshake_with_foreign_secret_rejected() {
    let app = TestApp::spawn().await;
    let token = encoder("some-other-secret")
        .issue(UserId::new())
        .unwrap()
        .token;
    expect_rejected(&app, app.ws_url(Some(&token)), StatusCode::UNAUTHORIZED).await;
    assert_eq!(app.registered(), 0);
}

#[tokio::test]
async fn test_handshake_with_expired_token_rejected() {
    let app = TestApp::spawn().await;
    let now = Utc::now().timestamp();
    let token = encoder(TEST_SECRET)
        .encode_claims(&Claims {
            sub: UserId::new(),
            iat: now - 7200,
            exp: now - 3600,
            jti: Uuid::new_v4(),
        })
        .unwrap();
    expect_rejected(&app, app.ws_url(Some(&token)), StatusCode::UNAUTHORIZED).await;
    assert_eq!(app.registered(), 0);
}

#[tokio::test]
async fn test_handshake_from_foreign_origin_rejected() {
    let app = TestApp::spawn().await;
    let user = app.signup("Ada", "ada@example.com").await;

    let mut request = app.ws_url(Some(&user.token)).into_client_request().unwrap();
    request
        .headers_mut()
        .insert("Origin", "http://evil.example".parse().unwrap());

    match connect_async(request).await {
        Err(WsError::Http(response)) => assert_eq!(response.status(), StatusCode::FORBIDDEN),
        other => panic!("expected 403, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_bearer_header_accepted() {
    let app = TestApp::spawn().await;
    let user = app.signup("Ada", "ada@example.com").await;

    let mut request = app.ws_url(None).into_client_request().unwrap();
    request.headers_mut().insert(
        "Authorization",
        format!("Bearer {}", user.token).parse().unwrap(),
    );
    let (mut ws, _) = connect_async(request).await.expect("handshake failed");

    let connected = next_event(&mut ws).await;
    assert_eq!(connected["event"], "connected");
    assert_eq!(connected["data"]["user_id"], user.id.as_str());
}

#[tokio::test]
async fn test_admitted_connection_is_registered_and_removed_on_close() {
    let app = TestApp::spawn().await;
    let user = app.signup("Ada", "ada@example.com").await;

    let (mut ws, _) = app.connect_ws(&user.token).await;
    assert_eq!(app.registered(), 1);

    ws.close(None).await.unwrap();
    app.wait_for_registered(0).await;
}

#[tokio::test]
async fn test_send_to_user_reaches_only_that_connection() {
    let app = TestApp::spawn().await;
    let u1 = app.signup("Ada", "ada@example.com").await;
    let u2 = app.signup("Grace", "grace@example.com").await;
    let (mut ws1, _) = app.connect_ws(&u1.token).await;
    let (mut ws2, _) = app.connect_ws(&u2.token).await;

    let sent = app
        .state
        .realtime
        .notifications
        .send_to_user(
            u1.id.parse().unwrap(),
            OutboundMessage::notification("Added New Task: Buy milk"),
        )
        .unwrap();
    assert_eq!(sent, 1);

    let event = next_event(&mut ws1).await;
    assert_eq!(event["event"], "notification");
    assert_eq!(event["data"]["message"], "Added New Task: Buy milk");
    assert_no_event(&mut ws1, Duration::from_millis(200)).await;
    assert_no_event(&mut ws2, Duration::from_millis(200)).await;
}

#[tokio::test]
async fn test_broadcast_reaches_every_user() {
    let app = TestApp::spawn().await;
    let u1 = app.signup("Ada", "ada@example.com").await;
    let u2 = app.signup("Grace", "grace@example.com").await;
    let (mut ws1, _) = app.connect_ws(&u1.token).await;
    let (mut ws2, _) = app.connect_ws(&u2.token).await;

    let sent = app
        .state
        .realtime
        .notifications
        .broadcast(OutboundMessage::notification("Maintenance at noon"))
        .unwrap();
    assert_eq!(sent, 2);

    for ws in [&mut ws1, &mut ws2] {
        let event = next_event(ws).await;
        assert_eq!(event["data"]["message"], "Maintenance at noon");
    }
}

#[tokio::test]
async fn test_second_connection_replaces_first() {
    let app = TestApp::spawn().await;
    let user = app.signup("Ada", "ada@example.com").await;
    let (mut first, _) = app.connect_ws(&user.token).await;
    let (mut second, connected) = app.connect_ws(&user.token).await;
    assert_eq!(app.registered(), 1);

    let user_id: UserId = user.id.parse().unwrap();
    let registered = app.state.realtime.registry.lookup(user_id).unwrap();
    assert_eq!(
        registered.id.to_string(),
        connected["data"]["connection_id"].as_str().unwrap()
    );

    // Closing the replaced connection must not evict its successor.
    first.close(None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(app.registered(), 1);

    app.create_task(&user, "Buy milk").await;
    let event = next_event(&mut second).await;
    assert_eq!(event["data"]["message"], "Added New Task: Buy milk");
}

#[tokio::test]
async fn test_ping_and_malformed_frames() {
    let app = TestApp::spawn().await;
    let user = app.signup("Ada", "ada@example.com").await;
    let (mut ws, _) = app.connect_ws(&user.token).await;

    ws.send(Message::Text(r#"{"event":"ping"}"#.into()))
        .await
        .unwrap();
    let pong = next_event(&mut ws).await;
    assert_eq!(pong["event"], "pong");

    ws.send(Message::Text("not json".into())).await.unwrap();
    let error = next_event(&mut ws).await;
    assert_eq!(error["event"], "error");
    assert_eq!(error["data"]["code"], "INVALID_MESSAGE");

    assert_eq!(app.registered(), 1);
}

#[tokio::test]
async fn test_shutdown_closes_connections_and_drops_events() {
    let app = TestApp::spawn().await;
    let user = app.signup("Ada", "ada@example.com").await;
    let (mut ws, _) = app.connect_ws(&user.token).await;

    app.state.realtime.shutdown();

    let closed = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(frame) = ws.next().await {
            match frame {
                Ok(Message::Close(_)) | Err(_) => return true,
                Ok(_) => continue,
            }
        }
        true
    })
    .await
    .expect("connection not closed after shutdown");
    assert!(closed);
    assert_eq!(app.registered(), 0);

    assert_eq!(
        app.state
            .realtime
            .notifications
            .send_to_user(user.id.parse().unwrap(), OutboundMessage::notification("x"))
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_silent_client_removed_by_heartbeat() {
    let mut config = test_config();
    config.realtime.ping_interval_seconds = 1;
    config.realtime.ping_timeout_seconds = 1;
    let app = TestApp::spawn_with(config).await;
    let user = app.signup("Ada", "ada@example.com").await;

    // Never polled again, so the server's pings go unanswered.
    let (_silent, _) = app.connect_ws(&user.token).await;
    assert_eq!(app.registered(), 1);

    app.wait_for_registered_within(0, Duration::from_secs(10))
        .await;
    assert_eq!(app.state.realtime.metrics_snapshot().connections_closed, 1);
}

#[tokio::test]
async fn test_responsive_client_survives_heartbeat() {
    let mut config = test_config();
    config.realtime.ping_interval_seconds = 1;
    config.realtime.ping_timeout_seconds = 1;
    let app = TestApp::spawn_with(config).await;
    let user = app.signup("Ada", "ada@example.com").await;

    // Reading the stream makes the client answer pings with pongs.
    let (mut ws, _) = app.connect_ws(&user.token).await;
    assert_no_event(&mut ws, Duration::from_millis(3500)).await;
    assert_eq!(app.registered(), 1);
}

#[tokio::test]
async fn test_connection_closed_when_token_expires() {
    let app = TestApp::spawn().await;
    let now = Utc::now().timestamp();
    let token = encoder(TEST_SECRET)
        .encode_claims(&Claims {
            sub: UserId::new(),
            iat: now,
            exp: now + 2,
            jti: Uuid::new_v4(),
        })
        .unwrap();

    let (mut ws, _) = app.connect_ws(&token).await;
    assert_eq!(app.registered(), 1);

    let closed = tokio::time::timeout(Duration::from_secs(10), async {
        while let Some(frame) = ws.next().await {
            if matches!(frame, Ok(Message::Close(_)) | Err(_)) {
                break;
            }
        }
    })
    .await;
    assert!(closed.is_ok(), "connection outlived its token");
    app.wait_for_registered(0).await;
}
