//! Errors raised by the real-time layer.

use thiserror::Error;

use taskhub_core::error::AppError;

use crate::connection::handle::ConnectionId;

/// Real-time engine errors.
#[derive(Debug, Error)]
pub enum RealtimeError {
    /// Dispatch attempted before `start` or after `shutdown`.
    #[error("Realtime engine not initialized")]
    NotInitialized,

    /// `start` called on an engine that has already been shut down.
    #[error("Realtime engine has been shut down")]
    ShutDown,

    /// No token was presented during the handshake.
    #[error("Unauthorized")]
    Unauthorized,

    /// The presented token failed verification.
    #[error("Invalid token")]
    InvalidToken,

    /// Token verification did not finish in time.
    #[error("Handshake timed out")]
    HandshakeTimeout,

    /// The connection's outbound queue is closed.
    #[error("Connection {0} is closed")]
    ConnectionClosed(ConnectionId),

    /// The connection's outbound queue is full.
    #[error("Send buffer full for connection {0}")]
    BufferFull(ConnectionId),

    /// A message could not be encoded or decoded.
    #[error("Message serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RealtimeError {
    /// Whether this error rejects a handshake.
    pub fn is_handshake_rejection(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized | Self::InvalidToken | Self::HandshakeTimeout
        )
    }
}

impl From<RealtimeError> for AppError {
    fn from(err: RealtimeError) -> Self {
        match err {
            e if e.is_handshake_rejection() => AppError::authentication(e.to_string()),
            RealtimeError::Serialization(e) => e.into(),
            other => AppError::internal(other.to_string()),
        }
    }
}
