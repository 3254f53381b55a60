//! Top-level real-time engine that ties together all subsystems.
//!
//! Built once at startup and shared through application state. Dispatch is
//! refused until [`RealtimeEngine::start`]; after [`RealtimeEngine::shutdown`]
//! events are dropped.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use taskhub_core::config::RealtimeConfig;
use taskhub_core::types::id::UserId;

use crate::bridge::event_bridge::EventBridge;
use crate::connection::authenticator::{HandshakeGate, TokenVerifier};
use crate::connection::handle::ConnectionHandle;
use crate::connection::heartbeat::Heartbeat;
use crate::connection::lifecycle::LifecycleHooks;
use crate::connection::registry::ConnectionRegistry;
use crate::error::RealtimeError;
use crate::message::types::OutboundMessage;
use crate::metrics::{MetricsSnapshot, RealtimeMetrics};
use crate::notification::dispatcher::NotificationDispatcher;

/// Central real-time engine that coordinates all WebSocket subsystems.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Connection registry.
    pub registry: Arc<ConnectionRegistry>,
    /// Handshake gate.
    pub gate: Arc<HandshakeGate>,
    /// Connect/disconnect hooks.
    pub lifecycle: Arc<LifecycleHooks>,
    /// Notification dispatcher.
    pub notifications: Arc<NotificationDispatcher>,
    /// Event bridge (domain events → notifications).
    pub event_bridge: Arc<EventBridge>,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
    /// Heartbeat timing.
    pub heartbeat: Heartbeat,
    config: RealtimeConfig,
    /// Parent of every connection's cancellation token.
    shutdown: CancellationToken,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("connections", &self.registry.len())
            .field("started", &self.is_started())
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine with all subsystems.
    pub fn new(config: RealtimeConfig, verifier: Arc<dyn TokenVerifier>) -> Self {
        let metrics = Arc::new(RealtimeMetrics::new());
        let registry = Arc::new(ConnectionRegistry::new());
        let gate = Arc::new(HandshakeGate::new(verifier, config.handshake_timeout()));
        let lifecycle = Arc::new(LifecycleHooks::new(registry.clone(), metrics.clone()));
        let notifications = Arc::new(NotificationDispatcher::new(
            registry.clone(),
            metrics.clone(),
        ));
        let event_bridge = Arc::new(EventBridge::new(notifications.clone()));

        info!("Real-time engine initialized");

        Self {
            registry,
            gate,
            lifecycle,
            notifications,
            event_bridge,
            metrics,
            heartbeat: Heartbeat::from_config(&config),
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Enable dispatching. Fails if the engine has been shut down.
    pub fn start(&self) -> Result<(), RealtimeError> {
        if self.shutdown.is_cancelled() {
            return Err(RealtimeError::ShutDown);
        }
        self.notifications.start();
        info!("Real-time engine started");
        Ok(())
    }

    /// Whether dispatching is enabled.
    pub fn is_started(&self) -> bool {
        self.notifications.is_started()
    }

    /// Engine configuration.
    pub fn config(&self) -> &RealtimeConfig {
        &self.config
    }

    /// Create the handle and outbound queue for an admitted connection.
    ///
    /// The handle is not registered; pass it to
    /// [`LifecycleHooks::on_connect`].
    pub fn open_connection(
        &self,
        user_id: UserId,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundMessage>) {
        ConnectionHandle::open(
            user_id,
            self.config.channel_buffer_size,
            self.shutdown.child_token(),
        )
    }

    /// Counter snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Stop dispatching and close every connection, including replaced ones
    /// that are no longer in the registry.
    ///
    /// Requests still in flight may publish afterwards; their events are
    /// dropped rather than failing the request.
    pub fn shutdown(&self) {
        info!("Shutting down real-time engine");

        self.notifications.stop();
        self.shutdown.cancel();
        let closed = self.registry.drain();
        for handle in &closed {
            handle.mark_dead();
        }

        info!(connections = closed.len(), "Real-time engine shut down");
    }
}
