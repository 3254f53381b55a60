//! Response DTOs.

use serde::{Deserialize, Serialize};

use taskhub_realtime::metrics::MetricsSnapshot;

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message text.
    pub message: String,
}

impl MessageResponse {
    /// Build a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Basic health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
}

/// Detailed health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// Overall status.
    pub status: String,
    /// Version.
    pub version: String,
    /// Database status.
    pub database: String,
    /// Real-time engine status.
    pub realtime: RealtimeHealth,
}

/// Real-time engine health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeHealth {
    /// Whether dispatching is enabled.
    pub started: bool,
    /// Users with a registered connection.
    pub connections: usize,
    /// Counters since startup.
    pub metrics: MetricsSnapshot,
}
