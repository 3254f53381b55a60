//! Task-related domain events.

use serde::{Deserialize, Serialize};

use crate::types::id::{TaskId, UserId};

/// Events related to task mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TaskEvent {
    /// A task was created.
    Created {
        /// The task ID.
        task_id: TaskId,
        /// The owning user.
        owner: UserId,
        /// The task title.
        title: String,
    },
    /// A task was updated.
    Updated {
        /// The task ID.
        task_id: TaskId,
        /// The owning user.
        owner: UserId,
        /// The task title after the update.
        title: String,
        /// Fields that changed.
        changed_fields: Vec<String>,
    },
    /// A task was deleted.
    Deleted {
        /// The task ID.
        task_id: TaskId,
        /// The owning user.
        owner: UserId,
        /// The title (for display after deletion).
        title: String,
    },
}

impl TaskEvent {
    /// The user who owns the affected task.
    pub fn owner(&self) -> UserId {
        match self {
            Self::Created { owner, .. }
            | Self::Updated { owner, .. }
            | Self::Deleted { owner, .. } => *owner,
        }
    }

    /// The title of the affected task.
    pub fn title(&self) -> &str {
        match self {
            Self::Created { title, .. }
            | Self::Updated { title, .. }
            | Self::Deleted { title, .. } => title,
        }
    }
}
