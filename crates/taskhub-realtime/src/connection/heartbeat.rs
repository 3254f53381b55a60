//! Ping/pong liveness for WebSocket connections.

use std::time::Duration;

use tokio::time::{self, Interval, MissedTickBehavior};
use tracing::warn;

use taskhub_core::config::RealtimeConfig;

use super::handle::ConnectionHandle;

/// Heartbeat timing.
#[derive(Debug, Clone, Copy)]
pub struct Heartbeat {
    /// Interval between pings
    pub ping_interval: Duration,
    /// How long past a ping to wait for the pong
    pub ping_timeout: Duration,
}

impl Heartbeat {
    /// Heartbeat timing from configuration.
    pub fn from_config(config: &RealtimeConfig) -> Self {
        Self {
            ping_interval: config.ping_interval(),
            ping_timeout: config.ping_timeout(),
        }
    }

    /// Ticker for the ping loop; the first tick fires one interval from now.
    pub fn ticker(&self) -> Interval {
        let period = self.ping_interval.max(Duration::from_millis(1));
        let mut interval = time::interval_at(time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    }

    /// Returns `false`, and closes the connection, once it has gone silent
    /// for longer than one interval plus the timeout.
    pub fn check(&self, handle: &ConnectionHandle) -> bool {
        let silent = handle.since_last_pong();
        if silent > self.ping_interval + self.ping_timeout {
            warn!(
                conn_id = %handle.id,
                user_id = %handle.user_id,
                silent_ms = silent.as_millis() as u64,
                "Heartbeat timeout"
            );
            handle.close();
            return false;
        }
        true
    }
}
