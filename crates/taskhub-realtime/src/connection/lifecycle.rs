//! Connect/disconnect bookkeeping.

use std::sync::Arc;

use tracing::info;

use crate::metrics::RealtimeMetrics;

use super::handle::ConnectionHandle;
use super::registry::ConnectionRegistry;

/// Registers admitted connections and cleans up after closed ones.
#[derive(Debug, Clone)]
pub struct LifecycleHooks {
    registry: Arc<ConnectionRegistry>,
    metrics: Arc<RealtimeMetrics>,
}

impl LifecycleHooks {
    /// Creates lifecycle hooks over the shared registry.
    pub fn new(registry: Arc<ConnectionRegistry>, metrics: Arc<RealtimeMetrics>) -> Self {
        Self { registry, metrics }
    }

    /// Called once the handshake gate has admitted the connection.
    pub fn on_connect(&self, handle: Arc<ConnectionHandle>) {
        let (conn_id, user_id) = (handle.id, handle.user_id);
        self.registry.register(user_id, handle);
        self.metrics.connection_opened();
        info!(conn_id = %conn_id, user_id = %user_id, "WebSocket connection registered");
    }

    /// Called on every close path: client close, transport error,
    /// heartbeat timeout, server shutdown.
    pub fn on_disconnect(&self, handle: &ConnectionHandle) {
        handle.mark_dead();
        let removed = self.registry.unregister(handle.user_id, handle);
        self.metrics.connection_closed();
        info!(
            conn_id = %handle.id,
            user_id = %handle.user_id,
            removed,
            "WebSocket connection closed"
        );
    }
}
