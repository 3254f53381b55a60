//! PostgreSQL repository implementations.

pub mod task;
pub mod user;

use taskhub_core::error::AppError;

/// Convert a sqlx error, keeping its kind but replacing the message.
pub(crate) fn map_db_error(context: &'static str, err: sqlx::Error) -> AppError {
    AppError {
        message: context.to_string(),
        ..AppError::from(err)
    }
}
