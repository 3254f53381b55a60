//! # taskhub-realtime
//!
//! Real-time notification layer for TaskHub.
//!
//! ## Subsystems
//!
//! - **Handshake gate** - verifies the bearer token of each new WebSocket
//!   before it is admitted
//! - **Connection registry** - one live connection per user, guarded removal
//! - **Lifecycle hooks** - register on admission, deregister on every close path
//! - **Notification dispatcher** - per-user delivery and broadcast
//! - **Event bridge** - turns committed task events into notifications
//! - **Heartbeat** - ping/pong liveness tracking
//! - **Metrics** - connection and delivery counters

pub mod bridge;
pub mod connection;
pub mod error;
pub mod message;
pub mod metrics;
pub mod notification;
pub mod server;

pub use error::RealtimeError;
pub use server::RealtimeEngine;
