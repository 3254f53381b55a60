//! Domain event → notification mapping.
//!
//! Bridges committed domain events from the service layer to the
//! notification dispatcher.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use taskhub_core::events::{DomainEvent, EventPayload};
use taskhub_core::result::AppResult;
use taskhub_core::traits::EventPublisher;

use crate::notification::dispatcher::NotificationDispatcher;
use crate::notification::formatter;

/// Publishes domain events as real-time notifications.
#[derive(Debug)]
pub struct EventBridge {
    notifications: Arc<NotificationDispatcher>,
}

impl EventBridge {
    /// Create a new event bridge
    pub fn new(notifications: Arc<NotificationDispatcher>) -> Self {
        Self { notifications }
    }
}

#[async_trait]
impl EventPublisher for EventBridge {
    async fn publish(&self, event: DomainEvent) -> AppResult<()> {
        match &event.payload {
            EventPayload::Task(task_event) => {
                let delivered = self
                    .notifications
                    .send_to_user(task_event.owner(), formatter::task_notification(task_event))?;
                debug!(
                    event_id = %event.id,
                    owner = %task_event.owner(),
                    delivered,
                    "Task event published"
                );
            }
        }
        Ok(())
    }
}
