//! Task repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use taskhub_core::result::AppResult;
use taskhub_core::traits::TaskRepository;
use taskhub_core::types::id::{TaskId, UserId};
use taskhub_entity::Task;

use super::map_db_error;

/// PostgreSQL-backed task repository.
#[derive(Debug, Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    /// Create a new task repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository<Task> for PgTaskRepository {
    async fn create(&self, task: &Task) -> AppResult<Task> {
        sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (id, title, description, completed, owner, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.completed)
        .bind(task.owner)
        .bind(task.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to create task", e))
    }

    async fn find_for_owner(&self, id: TaskId, owner: UserId) -> AppResult<Option<Task>> {
        sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1 AND owner = $2")
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to find task", e))
    }

    async fn list_for_owner(
        &self,
        owner: UserId,
        completed: Option<bool>,
    ) -> AppResult<Vec<Task>> {
        sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE owner = $1 \
             AND ($2::BOOLEAN IS NULL OR completed = $2) \
             ORDER BY created_at DESC",
        )
        .bind(owner)
        .bind(completed)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to list tasks", e))
    }

    async fn update(&self, task: &Task) -> AppResult<Task> {
        sqlx::query_as::<_, Task>(
            "UPDATE tasks SET title = $3, description = $4, completed = $5 \
             WHERE id = $1 AND owner = $2 RETURNING *",
        )
        .bind(task.id)
        .bind(task.owner)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.completed)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to update task", e))
    }

    async fn delete_for_owner(&self, id: TaskId, owner: UserId) -> AppResult<Option<Task>> {
        sqlx::query_as::<_, Task>("DELETE FROM tasks WHERE id = $1 AND owner = $2 RETURNING *")
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to delete task", e))
    }

    async fn delete_all_for_owner(&self, owner: UserId) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM tasks WHERE owner = $1")
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to delete tasks", e))?;
        Ok(result.rows_affected())
    }
}
