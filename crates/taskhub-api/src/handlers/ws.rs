//! WebSocket upgrade handler.
//!
//! The handshake gate runs before the upgrade, so a rejected attempt gets a
//! plain HTTP 401 and never reaches the registry.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::http::header::ORIGIN;
use axum::response::Response;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use taskhub_core::error::AppError;
use taskhub_realtime::RealtimeEngine;
use taskhub_realtime::connection::{AuthenticatedConnection, ConnectionHandle, Heartbeat};
use taskhub_realtime::message::handler::handle_text;
use taskhub_realtime::message::serializer::serialize_outbound;
use taskhub_realtime::message::types::OutboundMessage;

use crate::dto::request::WsQuery;
use crate::error::ApiError;
use crate::extractors::auth::bearer_token;
use crate::state::AppState;

/// GET /ws: WebSocket upgrade.
///
/// The token is read from `Authorization: Bearer`, or from `?token=` for
/// browser clients that cannot set headers on a WebSocket. Prefer the header.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    if let Some(origin) = headers.get(ORIGIN) {
        let origin = origin.to_str().unwrap_or_default();
        if !state.config.server.cors.is_origin_allowed(origin) {
            warn!(origin, "WebSocket origin rejected");
            return Err(AppError::forbidden("Origin not allowed").into());
        }
    }

    let token = bearer_token(&headers).or(query.token);
    let auth = state
        .realtime
        .gate
        .authenticate(token.as_deref())
        .await
        .inspect_err(|e| debug!(error = %e, "WebSocket handshake rejected"))?;

    let engine = state.realtime.clone();
    Ok(ws.on_upgrade(move |socket| handle_socket(engine, auth, socket)))
}

/// Drives an admitted connection until it closes.
async fn handle_socket(engine: RealtimeEngine, auth: AuthenticatedConnection, socket: WebSocket) {
    let (ws_tx, mut ws_rx) = socket.split();

    let (handle, outbound_rx) = engine.open_connection(auth.user_id);
    engine.lifecycle.on_connect(Arc::clone(&handle));

    let connected = OutboundMessage::Connected {
        connection_id: handle.id,
        user_id: auth.user_id,
    };
    if let Err(e) = handle.send(connected) {
        debug!(conn_id = %handle.id, error = %e, "Connected event not queued");
    }

    let writer = tokio::spawn(write_loop(
        Arc::clone(&handle),
        engine.heartbeat,
        outbound_rx,
        ws_tx,
    ));

    let cancel = handle.cancellation().clone();
    let token_expiry = tokio::time::sleep(auth.remaining());
    tokio::pin!(token_expiry);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = &mut token_expiry => {
                debug!(conn_id = %handle.id, user_id = %handle.user_id, "Token expired, closing connection");
                break;
            }
            frame = ws_rx.next() => match frame {
                Some(Ok(Message::Text(text))) => handle_text(&handle, text.as_str()),
                Some(Ok(Message::Pong(_))) => handle.record_pong(),
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(conn_id = %handle.id, error = %e, "WebSocket error");
                    break;
                }
            },
        }
    }

    handle.close();
    engine.lifecycle.on_disconnect(&handle);
    if let Err(e) = writer.await {
        debug!(conn_id = %handle.id, error = %e, "Writer task ended abnormally");
    }
}

/// Drains the outbound queue into the socket and sends heartbeat pings.
async fn write_loop(
    handle: Arc<ConnectionHandle>,
    heartbeat: Heartbeat,
    mut outbound_rx: mpsc::Receiver<OutboundMessage>,
    mut ws_tx: SplitSink<WebSocket, Message>,
) {
    let cancel = handle.cancellation().clone();
    let mut ticker = heartbeat.ticker();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            msg = outbound_rx.recv() => {
                let Some(msg) = msg else { break };
                let text = match serialize_outbound(&msg) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(conn_id = %handle.id, error = %e, "Dropping unserializable message");
                        continue;
                    }
                };
                if ws_tx.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            _ = ticker.tick() => {
                if !heartbeat.check(&handle) {
                    break;
                }
                if ws_tx.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    handle.close();
    let _ = ws_tx.send(Message::Close(None)).await;
}
