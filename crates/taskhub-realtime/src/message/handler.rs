//! Inbound text frame handling.

use chrono::Utc;
use tracing::debug;

use crate::connection::handle::ConnectionHandle;

use super::serializer::deserialize_inbound;
use super::types::{InboundMessage, OutboundMessage};

/// Handle one text frame from the client.
///
/// Malformed frames are answered with an `error` event; the connection
/// stays open.
pub fn handle_text(handle: &ConnectionHandle, text: &str) {
    let reply = match deserialize_inbound(text) {
        Ok(InboundMessage::Ping) => OutboundMessage::Pong {
            timestamp: Utc::now(),
        },
        Err(e) => {
            debug!(conn_id = %handle.id, error = %e, "Malformed client frame");
            OutboundMessage::Error {
                code: "INVALID_MESSAGE".to_string(),
                message: format!("Failed to parse message: {e}"),
            }
        }
    };

    if let Err(e) = handle.send(reply) {
        debug!(conn_id = %handle.id, error = %e, "Reply not queued");
    }
}
