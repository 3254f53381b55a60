//! Repository traits for user and task persistence.
//!
//! The entity types live in `taskhub-entity`, which depends on this crate,
//! so the traits are generic over them.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::id::{TaskId, UserId};

/// User persistence.
#[async_trait]
pub trait UserRepository<User>: Send + Sync + std::fmt::Debug + 'static
where
    User: Send + Sync + 'static,
{
    /// Find a user by primary key.
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// Find a user by (lower-cased) email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Insert a new user. Fails with a conflict error on duplicate email.
    async fn create(&self, user: &User) -> AppResult<User>;

    /// Persist changes to name, email and password hash.
    async fn update(&self, user: &User) -> AppResult<User>;

    /// Delete a user. Returns `true` if a row was removed.
    async fn delete(&self, id: UserId) -> AppResult<bool>;

    /// Record an issued token as active for the user.
    async fn add_token(&self, id: UserId, token: &str) -> AppResult<()>;

    /// Revoke a token. Returns `true` if it was active.
    async fn remove_token(&self, id: UserId, token: &str) -> AppResult<bool>;

    /// Whether the token is still active for the user.
    async fn has_token(&self, id: UserId, token: &str) -> AppResult<bool>;
}

/// Task persistence. Every query is scoped by owner.
#[async_trait]
pub trait TaskRepository<Task>: Send + Sync + std::fmt::Debug + 'static
where
    Task: Send + Sync + 'static,
{
    /// Insert a new task.
    async fn create(&self, task: &Task) -> AppResult<Task>;

    /// Find a task by ID for the given owner.
    async fn find_for_owner(&self, id: TaskId, owner: UserId) -> AppResult<Option<Task>>;

    /// List the owner's tasks, optionally filtered by completion state,
    /// newest first.
    async fn list_for_owner(&self, owner: UserId, completed: Option<bool>)
    -> AppResult<Vec<Task>>;

    /// Persist title, description and completion state.
    async fn update(&self, task: &Task) -> AppResult<Task>;

    /// Delete and return the owner's task, if it exists.
    async fn delete_for_owner(&self, id: TaskId, owner: UserId) -> AppResult<Option<Task>>;

    /// Delete every task of the owner. Returns the number removed.
    async fn delete_all_for_owner(&self, owner: UserId) -> AppResult<u64>;
}
