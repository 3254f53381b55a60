//! JSON encoding for WebSocket frames.

use super::types::{InboundMessage, OutboundMessage};
use crate::error::RealtimeError;

/// Serialize an outbound message to a text frame payload.
pub fn serialize_outbound(msg: &OutboundMessage) -> Result<String, RealtimeError> {
    Ok(serde_json::to_string(msg)?)
}

/// Parse a text frame from the client.
pub fn deserialize_inbound(text: &str) -> Result<InboundMessage, RealtimeError> {
    Ok(serde_json::from_str(text)?)
}
