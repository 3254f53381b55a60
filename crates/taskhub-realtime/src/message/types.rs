//! Typed WebSocket messages.
//!
//! Every frame uses the `{"event": ..., "data": ...}` envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use taskhub_core::types::id::UserId;

use crate::connection::handle::ConnectionId;

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Application-level keepalive.
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Sent once the handshake has admitted the connection.
    Connected {
        /// Connection ID.
        connection_id: ConnectionId,
        /// Authenticated user.
        user_id: UserId,
    },
    /// A user-facing notification.
    Notification(NotificationPayload),
    /// Reply to an inbound `ping`.
    Pong {
        /// Server time.
        timestamp: DateTime<Utc>,
    },
    /// Protocol error.
    Error {
        /// Error code.
        code: String,
        /// Human-readable message.
        message: String,
    },
}

/// Payload of a `notification` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// Notification text.
    pub message: String,
    /// When the notification was produced.
    pub timestamp: DateTime<Utc>,
}

impl OutboundMessage {
    /// Build a notification stamped with the current time.
    pub fn notification(message: impl Into<String>) -> Self {
        Self::Notification(NotificationPayload {
            message: message.into(),
            timestamp: Utc::now(),
        })
    }

    /// Event name as it appears on the wire.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::Notification(_) => "notification",
            Self::Pong { .. } => "pong",
            Self::Error { .. } => "error",
        }
    }
}
