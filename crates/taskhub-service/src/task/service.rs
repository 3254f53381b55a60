//! Task CRUD scoped to the owning user.
//!
//! Every successful mutation publishes a [`TaskEvent`] after the repository
//! call has returned, so subscribers never hear about a change that did not
//! happen.

use std::sync::Arc;

use tracing::info;

use taskhub_core::error::AppError;
use taskhub_core::events::{DomainEvent, TaskEvent};
use taskhub_core::traits::{EventPublisher, TaskRepository};
use taskhub_core::types::id::{TaskId, UserId};
use taskhub_entity::{Task, TaskChanges};

const MAX_TITLE_LENGTH: usize = 100;
const MAX_DESCRIPTION_LENGTH: usize = 500;

/// A task to create.
#[derive(Debug, Clone)]
pub struct CreateTaskInput {
    /// Title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Initial completion state.
    pub completed: bool,
}

/// Task changes. Absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateTaskInput {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New completion state.
    pub completed: Option<bool>,
}

/// Manages a user's tasks.
#[derive(Debug, Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskRepository<Task>>,
    publisher: Arc<dyn EventPublisher>,
}

impl TaskService {
    /// Creates a new task service.
    pub fn new(tasks: Arc<dyn TaskRepository<Task>>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self { tasks, publisher }
    }

    /// Creates a task for the owner.
    pub async fn create(&self, owner: UserId, input: CreateTaskInput) -> Result<Task, AppError> {
        check_title(&input.title)?;
        if let Some(ref description) = input.description {
            check_description(description)?;
        }

        let task = Task::new(
            owner,
            &input.title,
            input.description.as_deref(),
            input.completed,
        );
        let task = self.tasks.create(&task).await?;
        info!(task_id = %task.id, owner = %owner, "Task created");

        self.publisher
            .publish(DomainEvent::task(TaskEvent::Created {
                task_id: task.id,
                owner,
                title: task.title.clone(),
            }))
            .await?;

        Ok(task)
    }

    /// Lists the owner's tasks. Without a filter only open tasks are returned.
    pub async fn list(&self, owner: UserId, completed: Option<bool>) -> Result<Vec<Task>, AppError> {
        self.tasks
            .list_for_owner(owner, Some(completed.unwrap_or(false)))
            .await
    }

    /// Gets one of the owner's tasks.
    pub async fn get(&self, owner: UserId, id: TaskId) -> Result<Task, AppError> {
        self.tasks
            .find_for_owner(id, owner)
            .await?
            .ok_or_else(task_not_found)
    }

    /// Applies changes to one of the owner's tasks.
    pub async fn update(
        &self,
        owner: UserId,
        id: TaskId,
        input: UpdateTaskInput,
    ) -> Result<Task, AppError> {
        if let Some(ref title) = input.title {
            check_title(title)?;
        }
        if let Some(ref description) = input.description {
            check_description(description)?;
        }

        let mut task = self.get(owner, id).await?;
        let changes = TaskChanges {
            title: input.title,
            description: input.description,
            completed: input.completed,
        };
        let changed_fields = changes.changed_fields();
        changes.apply(&mut task);

        let task = self.tasks.update(&task).await?;
        info!(task_id = %task.id, owner = %owner, ?changed_fields, "Task updated");

        self.publisher
            .publish(DomainEvent::task(TaskEvent::Updated {
                task_id: task.id,
                owner,
                title: task.title.clone(),
                changed_fields,
            }))
            .await?;

        Ok(task)
    }

    /// Deletes one of the owner's tasks and returns it.
    pub async fn delete(&self, owner: UserId, id: TaskId) -> Result<Task, AppError> {
        let task = self
            .tasks
            .delete_for_owner(id, owner)
            .await?
            .ok_or_else(task_not_found)?;
        info!(task_id = %task.id, owner = %owner, "Task deleted");

        self.publisher
            .publish(DomainEvent::task(TaskEvent::Deleted {
                task_id: task.id,
                owner,
                title: task.title.clone(),
            }))
            .await?;

        Ok(task)
    }
}

fn task_not_found() -> AppError {
    AppError::not_found("Task not found")
}

fn check_title(title: &str) -> Result<(), AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::validation("Title is required"));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(AppError::validation(format!(
            "Title cannot exceed {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

fn check_description(description: &str) -> Result<(), AppError> {
    if description.trim().chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(AppError::validation(format!(
            "Description cannot exceed {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(())
}
