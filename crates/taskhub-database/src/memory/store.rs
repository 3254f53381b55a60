//! `DashMap`-backed store with the same contracts as the PostgreSQL
//! repositories, including unique emails and owner-scoped task access.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;
use taskhub_core::traits::{TaskRepository, UserRepository};
use taskhub_core::types::id::{TaskId, UserId};
use taskhub_entity::{Task, User};

/// Shared in-memory tables.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<UserId, User>,
    emails: DashMap<String, UserId>,
    tokens: DashMap<UserId, HashSet<String>>,
    tasks: DashMap<TaskId, Task>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// In-memory user repository.
#[derive(Debug, Clone)]
pub struct MemoryUserRepository {
    store: Arc<MemoryStore>,
}

impl MemoryUserRepository {
    /// Create a repository over a shared store.
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository<User> for MemoryUserRepository {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.store.users.get(&id).map(|u| u.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let key = email.to_lowercase();
        let Some(id) = self.store.emails.get(&key).map(|e| *e.value()) else {
            return Ok(None);
        };
        self.find_by_id(id).await
    }

    async fn create(&self, user: &User) -> AppResult<User> {
        match self.store.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => return Err(AppError::conflict("Email already in use")),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
            }
        }
        self.store.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> AppResult<User> {
        let previous_email = self
            .store
            .users
            .get(&user.id)
            .map(|u| u.email.clone())
            .ok_or_else(|| AppError::not_found("User not found"))?;

        if previous_email != user.email {
            match self.store.emails.entry(user.email.clone()) {
                Entry::Occupied(_) => return Err(AppError::conflict("Email already in use")),
                Entry::Vacant(slot) => {
                    slot.insert(user.id);
                }
            }
            self.store.emails.remove(&previous_email);
        }

        self.store.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn delete(&self, id: UserId) -> AppResult<bool> {
        let Some((_, user)) = self.store.users.remove(&id) else {
            return Ok(false);
        };
        self.store.emails.remove(&user.email);
        self.store.tokens.remove(&id);
        self.store.tasks.retain(|_, task| task.owner != id);
        Ok(true)
    }

    async fn add_token(&self, id: UserId, token: &str) -> AppResult<()> {
        self.store
            .tokens
            .entry(id)
            .or_default()
            .insert(token.to_string());
        Ok(())
    }

    async fn remove_token(&self, id: UserId, token: &str) -> AppResult<bool> {
        Ok(self
            .store
            .tokens
            .get_mut(&id)
            .map(|mut set| set.remove(token))
            .unwrap_or(false))
    }

    async fn has_token(&self, id: UserId, token: &str) -> AppResult<bool> {
        Ok(self
            .store
            .tokens
            .get(&id)
            .map(|set| set.contains(token))
            .unwrap_or(false))
    }
}

/// In-memory task repository.
#[derive(Debug, Clone)]
pub struct MemoryTaskRepository {
    store: Arc<MemoryStore>,
}

impl MemoryTaskRepository {
    /// Create a repository over a shared store.
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TaskRepository<Task> for MemoryTaskRepository {
    async fn create(&self, task: &Task) -> AppResult<Task> {
        self.store.tasks.insert(task.id, task.clone());
        Ok(task.clone())
    }

    async fn find_for_owner(&self, id: TaskId, owner: UserId) -> AppResult<Option<Task>> {
        Ok(self
            .store
            .tasks
            .get(&id)
            .filter(|t| t.owner == owner)
            .map(|t| t.value().clone()))
    }

    async fn list_for_owner(
        &self,
        owner: UserId,
        completed: Option<bool>,
    ) -> AppResult<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .store
            .tasks
            .iter()
            .filter(|t| t.owner == owner)
            .filter(|t| completed.is_none_or(|c| t.completed == c))
            .map(|t| t.value().clone())
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn update(&self, task: &Task) -> AppResult<Task> {
        match self.store.tasks.get_mut(&task.id) {
            Some(mut existing) if existing.owner == task.owner => {
                existing.title = task.title.clone();
                existing.description = task.description.clone();
                existing.completed = task.completed;
                Ok(existing.value().clone())
            }
            _ => Err(AppError::not_found("Task not found")),
        }
    }

    async fn delete_for_owner(&self, id: TaskId, owner: UserId) -> AppResult<Option<Task>> {
        Ok(self
            .store
            .tasks
            .remove_if(&id, |_, t| t.owner == owner)
            .map(|(_, t)| t))
    }

    async fn delete_all_for_owner(&self, owner: UserId) -> AppResult<u64> {
        let mut removed = 0u64;
        self.store.tasks.retain(|_, t| {
            let keep = t.owner != owner;
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}
