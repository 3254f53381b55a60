//! Notification dispatcher: routes typed events to live connections.
//!
//! Delivery is at-most-once and best-effort: no queueing for offline users,
//! no retries. A failure on one connection is logged and never reaches the
//! caller or other recipients.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use tracing::{debug, warn};

use taskhub_core::types::id::UserId;

use crate::connection::handle::ConnectionHandle;
use crate::connection::registry::ConnectionRegistry;
use crate::error::RealtimeError;
use crate::message::types::OutboundMessage;
use crate::metrics::RealtimeMetrics;

const IDLE: u8 = 0;
const RUNNING: u8 = 1;
const STOPPED: u8 = 2;

/// Dispatches outbound events to registered connections.
///
/// Before [`start`](Self::start) every dispatch fails with
/// [`RealtimeError::NotInitialized`]. After [`stop`](Self::stop) events are
/// dropped, so requests still draining during shutdown are unaffected.
#[derive(Debug)]
pub struct NotificationDispatcher {
    registry: Arc<ConnectionRegistry>,
    metrics: Arc<RealtimeMetrics>,
    state: AtomicU8,
}

impl NotificationDispatcher {
    /// Create a dispatcher. It refuses to dispatch until [`start`](Self::start).
    pub fn new(registry: Arc<ConnectionRegistry>, metrics: Arc<RealtimeMetrics>) -> Self {
        Self {
            registry,
            metrics,
            state: AtomicU8::new(IDLE),
        }
    }

    /// Allow dispatching. Has no effect once stopped.
    pub fn start(&self) {
        let _ = self
            .state
            .compare_exchange(IDLE, RUNNING, Ordering::SeqCst, Ordering::SeqCst);
    }

    /// Stop dispatching for good; later events are dropped.
    pub fn stop(&self) {
        self.state.store(STOPPED, Ordering::SeqCst);
    }

    /// Whether dispatching is allowed.
    pub fn is_started(&self) -> bool {
        self.state.load(Ordering::SeqCst) == RUNNING
    }

    /// Whether [`stop`](Self::stop) has been called.
    pub fn is_stopped(&self) -> bool {
        self.state.load(Ordering::SeqCst) == STOPPED
    }

    /// Send to the user's current connection.
    ///
    /// Returns the number of connections the event was handed to: `0` when
    /// the user is offline, the enqueue failed or the dispatcher is stopped.
    pub fn send_to_user(
        &self,
        user_id: UserId,
        msg: OutboundMessage,
    ) -> Result<usize, RealtimeError> {
        if !self.accepting(&msg)? {
            return Ok(0);
        }

        let Some(handle) = self.registry.lookup(user_id) else {
            debug!(
                user_id = %user_id,
                event = msg.event_name(),
                "No live connection, event dropped"
            );
            self.metrics.event_dropped();
            return Ok(0);
        };

        Ok(self.deliver(&handle, msg))
    }

    /// Send to every registered connection.
    pub fn broadcast(&self, msg: OutboundMessage) -> Result<usize, RealtimeError> {
        if !self.accepting(&msg)? {
            return Ok(0);
        }

        let delivered: usize = self
            .registry
            .all_connections()
            .iter()
            .map(|handle| self.deliver(handle, msg.clone()))
            .sum();

        debug!(event = msg.event_name(), delivered, "Broadcast dispatched");
        Ok(delivered)
    }

    fn deliver(&self, handle: &ConnectionHandle, msg: OutboundMessage) -> usize {
        let event = msg.event_name();
        match handle.send(msg) {
            Ok(()) => {
                self.metrics.event_delivered();
                1
            }
            Err(e) => {
                warn!(
                    conn_id = %handle.id,
                    user_id = %handle.user_id,
                    event,
                    error = %e,
                    "Event delivery failed"
                );
                self.metrics.event_dropped();
                0
            }
        }
    }

    fn accepting(&self, msg: &OutboundMessage) -> Result<bool, RealtimeError> {
        match self.state.load(Ordering::SeqCst) {
            RUNNING => Ok(true),
            STOPPED => {
                debug!(event = msg.event_name(), "Dispatcher stopped, event dropped");
                self.metrics.event_dropped();
                Ok(false)
            }
            _ => Err(RealtimeError::NotInitialized),
        }
    }
}
