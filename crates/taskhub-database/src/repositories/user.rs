//! User repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use taskhub_core::result::AppResult;
use taskhub_core::traits::UserRepository;
use taskhub_core::types::id::UserId;
use taskhub_entity::User;

use super::map_db_error;

/// PostgreSQL-backed user repository.
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository<User> for PgUserRepository {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to find user by id", e))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to find user by email", e))
    }

    async fn create(&self, user: &User) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, name, email, password_hash, created_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to create user", e))
    }

    async fn update(&self, user: &User) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET name = $2, email = $3, password_hash = $4 \
             WHERE id = $1 RETURNING *",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to update user", e))
    }

    async fn delete(&self, id: UserId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to delete user", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_token(&self, id: UserId, token: &str) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO user_tokens (user_id, token) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to store token", e))?;
        Ok(())
    }

    async fn remove_token(&self, id: UserId, token: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM user_tokens WHERE user_id = $1 AND token = $2")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to revoke token", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn has_token(&self, id: UserId, token: &str) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM user_tokens WHERE user_id = $1 AND token = $2)",
        )
        .bind(id)
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to check token", e))
    }
}
