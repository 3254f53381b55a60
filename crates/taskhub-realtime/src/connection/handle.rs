//! Individual WebSocket connection handle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use taskhub_core::types::id::UserId;

use crate::error::RealtimeError;
use crate::message::types::OutboundMessage;

/// Unique connection identifier
pub type ConnectionId = Uuid;

/// A handle to a single WebSocket connection.
///
/// The transport task owns the receiving end of the outbound queue; the
/// registry and dispatcher only hold `Arc`s to the handle.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Identity attached by the handshake gate
    pub user_id: UserId,
    /// When the connection was admitted
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<OutboundMessage>,
    opened: Instant,
    /// Milliseconds after `opened` at which the last pong arrived
    last_pong_ms: AtomicU64,
    alive: AtomicBool,
    cancel: CancellationToken,
}

impl ConnectionHandle {
    /// Create a handle around an existing outbound sender.
    pub fn new(
        user_id: UserId,
        sender: mpsc::Sender<OutboundMessage>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            connected_at: Utc::now(),
            sender,
            opened: Instant::now(),
            last_pong_ms: AtomicU64::new(0),
            alive: AtomicBool::new(true),
            cancel,
        }
    }

    /// Create a handle with a fresh bounded outbound queue.
    pub fn open(
        user_id: UserId,
        buffer: usize,
        cancel: CancellationToken,
    ) -> (Arc<Self>, mpsc::Receiver<OutboundMessage>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Arc::new(Self::new(user_id, tx, cancel)), rx)
    }

    /// Enqueue an outbound message without waiting.
    pub fn send(&self, msg: OutboundMessage) -> Result<(), RealtimeError> {
        if !self.is_alive() {
            return Err(RealtimeError::ConnectionClosed(self.id));
        }
        match self.sender.try_send(msg) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => Err(RealtimeError::BufferFull(self.id)),
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                Err(RealtimeError::ConnectionClosed(self.id))
            }
        }
    }

    /// Check if connection is alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark connection as dead
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Mark the connection dead and ask the transport task to close it.
    pub fn close(&self) {
        self.mark_dead();
        self.cancel.cancel();
    }

    /// Token cancelled when the connection should close.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Record a pong from the client.
    pub fn record_pong(&self) {
        let ms = self.opened.elapsed().as_millis() as u64;
        self.last_pong_ms.store(ms, Ordering::Relaxed);
    }

    /// Time since the last pong, or since admission if none arrived yet.
    pub fn since_last_pong(&self) -> std::time::Duration {
        let last = std::time::Duration::from_millis(self.last_pong_ms.load(Ordering::Relaxed));
        self.opened.elapsed().saturating_sub(last)
    }
}
