//! PostgreSQL pool: connect, migrate, ping, close.

use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use taskhub_core::config::DatabaseConfig;
use taskhub_core::error::{AppError, ErrorKind};

use crate::repositories::map_db_error;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Shared PostgreSQL pool behind the Pg repositories.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Connect with the configured limits, then apply pending migrations
    /// when `run_migrations` is set.
    pub async fn open(config: &DatabaseConfig) -> Result<Self, AppError> {
        info!(
            target_db = %connection_target(&config.url),
            max_connections = config.max_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| map_db_error("Failed to connect to database", e))?;

        if config.run_migrations {
            MIGRATOR.run(&pool).await.map_err(|e| {
                AppError::with_source(ErrorKind::Database, format!("Failed to run migrations: {e}"), e)
            })?;
            info!(migrations = MIGRATOR.iter().count(), "Schema up to date");
        }

        Ok(Self { pool })
    }

    /// Raw pool for the repositories.
    pub(crate) fn inner(&self) -> &PgPool {
        &self.pool
    }

    /// `SELECT 1` round trip.
    pub async fn ping(&self) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|one| one == 1)
            .map_err(|e| map_db_error("Database ping failed", e))
    }

    /// Wait for checked-out connections and close the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}

/// `host[:port]/database` part of a connection URL, without credentials.
fn connection_target(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    rest.rsplit_once('@').map_or(rest, |(_, host)| host)
}
