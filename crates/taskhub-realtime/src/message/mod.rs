//! WebSocket message protocol.

pub mod handler;
pub mod serializer;
pub mod types;

pub use types::{InboundMessage, NotificationPayload, OutboundMessage};
