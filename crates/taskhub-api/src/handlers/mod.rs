//! HTTP and WebSocket handlers.

pub mod health;
pub mod task;
pub mod user;
pub mod ws;
