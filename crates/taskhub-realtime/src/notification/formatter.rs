//! Human-readable notification text for domain events.

use taskhub_core::events::TaskEvent;

use crate::message::types::OutboundMessage;

/// Notification text for a task event.
pub fn task_message(event: &TaskEvent) -> String {
    match event {
        TaskEvent::Created { title, .. } => format!("Added New Task: {title}"),
        TaskEvent::Updated { title, .. } => format!("Updated Task: {title}"),
        TaskEvent::Deleted { title, .. } => format!("Deleted Task: {title}"),
    }
}

/// Notification message for a task event, stamped now.
pub fn task_notification(event: &TaskEvent) -> OutboundMessage {
    OutboundMessage::notification(task_message(event))
}
