//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use taskhub_auth::jwt::JwtDecoder;
use taskhub_core::config::AppConfig;
use taskhub_database::Repositories;
use taskhub_realtime::RealtimeEngine;
use taskhub_service::{TaskService, UserService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Repositories (PostgreSQL or in-memory)
    pub repos: Repositories,
    /// Bearer token validation
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Accounts and sessions
    pub user_service: Arc<UserService>,
    /// Owner-scoped tasks
    pub task_service: Arc<TaskService>,
    /// Real-time engine
    pub realtime: RealtimeEngine,
}
