//! Task entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use taskhub_core::types::id::{TaskId, UserId};

/// A task owned by a single user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique task identifier.
    pub id: TaskId,
    /// Title, trimmed.
    pub title: String,
    /// Optional description, trimmed.
    pub description: Option<String>,
    /// Completion state.
    pub completed: bool,
    /// Owning user.
    pub owner: UserId,
    /// Creation time. Immutable.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Build a new task with a fresh ID.
    pub fn new(owner: UserId, title: &str, description: Option<&str>, completed: bool) -> Self {
        Self {
            id: TaskId::new(),
            title: title.trim().to_string(),
            description: description.map(|d| d.trim().to_string()),
            completed,
            owner,
            created_at: Utc::now(),
        }
    }
}

/// Partial update of a task. Absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New completion state.
    pub completed: Option<bool>,
}

impl TaskChanges {
    /// Names of the fields present in this change set.
    pub fn changed_fields(&self) -> Vec<String> {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push("title".to_string());
        }
        if self.description.is_some() {
            fields.push("description".to_string());
        }
        if self.completed.is_some() {
            fields.push("completed".to_string());
        }
        fields
    }

    /// Apply the changes to a task in place.
    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            task.description = Some(description.trim().to_string());
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}
