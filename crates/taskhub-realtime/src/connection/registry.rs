//! Identity → live connection map.
//!
//! At most one connection is reachable per user. A later registration
//! replaces the earlier one; the replaced connection stays open but no
//! longer receives dispatched events. Removal is guarded by connection ID
//! so a late close of a replaced connection cannot evict its successor.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use taskhub_core::types::id::UserId;

use super::handle::ConnectionHandle;

/// Concurrent registry of live connections keyed by user.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: DashMap<UserId, Arc<ConnectionHandle>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map the user to this connection, returning the one it replaced.
    pub fn register(
        &self,
        user_id: UserId,
        handle: Arc<ConnectionHandle>,
    ) -> Option<Arc<ConnectionHandle>> {
        let conn_id = handle.id;
        let replaced = self.connections.insert(user_id, handle);
        if let Some(ref old) = replaced {
            debug!(
                user_id = %user_id,
                conn_id = %conn_id,
                replaced_conn_id = %old.id,
                "Connection replaced previous registry entry"
            );
        }
        replaced
    }

    /// Remove the mapping only if it still points at this connection.
    ///
    /// Returns `true` if an entry was removed.
    pub fn unregister(&self, user_id: UserId, handle: &ConnectionHandle) -> bool {
        let removed = self
            .connections
            .remove_if(&user_id, |_, current| current.id == handle.id)
            .is_some();
        if !removed {
            debug!(
                user_id = %user_id,
                conn_id = %handle.id,
                "Stale unregister ignored"
            );
        }
        removed
    }

    /// Current connection for the user.
    pub fn lookup(&self, user_id: UserId) -> Option<Arc<ConnectionHandle>> {
        self.connections
            .get(&user_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Number of registered users.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether no user is registered.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Snapshot of every registered connection.
    pub fn all_connections(&self) -> Vec<Arc<ConnectionHandle>> {
        self.connections
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Remove every entry and return the removed connections.
    pub fn drain(&self) -> Vec<Arc<ConnectionHandle>> {
        let handles = self.all_connections();
        self.connections.clear();
        handles
    }
}
