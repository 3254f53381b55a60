//! # taskhub-database
//!
//! PostgreSQL connection management, migrations, and the concrete user and
//! task repositories. An in-memory backend with the same contracts is used
//! by tests and by `database.provider = "memory"`.

pub mod memory;
pub mod pool;
pub mod repositories;

use std::sync::Arc;

use tracing::info;

use taskhub_core::config::DatabaseConfig;
use taskhub_core::error::AppError;
use taskhub_core::traits::{TaskRepository, UserRepository};
use taskhub_entity::{Task, User};

pub use pool::DatabasePool;

/// The repositories the service layer needs, behind trait objects.
#[derive(Debug, Clone)]
pub struct Repositories {
    /// User repository.
    pub users: Arc<dyn UserRepository<User>>,
    /// Task repository.
    pub tasks: Arc<dyn TaskRepository<Task>>,
    /// Pool handle when backed by PostgreSQL.
    pub pool: Option<DatabasePool>,
}

impl Repositories {
    /// Build in-memory repositories.
    pub fn in_memory() -> Self {
        let store = Arc::new(memory::MemoryStore::new());
        Self {
            users: Arc::new(memory::MemoryUserRepository::new(Arc::clone(&store))),
            tasks: Arc::new(memory::MemoryTaskRepository::new(store)),
            pool: None,
        }
    }

    /// Build PostgreSQL-backed repositories over an existing pool.
    pub fn postgres(pool: DatabasePool) -> Self {
        Self {
            users: Arc::new(repositories::user::PgUserRepository::new(
                pool.inner().clone(),
            )),
            tasks: Arc::new(repositories::task::PgTaskRepository::new(
                pool.inner().clone(),
            )),
            pool: Some(pool),
        }
    }

    /// Pick the backend named by `database.provider`.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        match config.provider.as_str() {
            "memory" => {
                info!("Using in-memory database provider");
                Ok(Self::in_memory())
            }
            "postgres" => {
                let pool = DatabasePool::open(config).await?;
                Ok(Self::postgres(pool))
            }
            other => Err(AppError::configuration(format!(
                "Unknown database provider '{other}'"
            ))),
        }
    }

    /// Check backend connectivity. The in-memory backend is always healthy.
    pub async fn health_check(&self) -> Result<bool, AppError> {
        match &self.pool {
            Some(pool) => pool.ping().await,
            None => Ok(true),
        }
    }
}
