//! Application builder: wires repositories, services and the real-time
//! engine into state, and runs the server.

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use tracing::info;

use taskhub_auth::jwt::{JwtDecoder, JwtEncoder};
use taskhub_auth::password::PasswordHasher;
use taskhub_core::config::AppConfig;
use taskhub_core::error::AppError;
use taskhub_database::Repositories;
use taskhub_realtime::RealtimeEngine;
use taskhub_service::{TaskService, UserService};

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Connects storage and constructs every service. The real-time engine is
/// started before the state is returned.
pub async fn build_state(config: AppConfig) -> Result<AppState, AppError> {
    // ── Repositories ─────────────────────────────────────────────
    info!(provider = %config.database.provider, "Initializing repositories");
    let repos = Repositories::connect(&config.database).await?;

    // ── Auth ─────────────────────────────────────────────────────
    let password_hasher = Arc::new(PasswordHasher::new());
    let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));
    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));

    // ── Real-time engine ─────────────────────────────────────────
    let realtime = RealtimeEngine::new(config.realtime.clone(), jwt_decoder.clone());

    // ── Services ─────────────────────────────────────────────────
    let user_service = Arc::new(UserService::new(
        Arc::clone(&repos.users),
        Arc::clone(&repos.tasks),
        password_hasher,
        jwt_encoder,
        config.auth.password_min_length,
    ));
    let task_service = Arc::new(TaskService::new(
        Arc::clone(&repos.tasks),
        realtime.event_bridge.clone(),
    ));

    realtime.start()?;

    Ok(AppState {
        config: Arc::new(config),
        repos,
        jwt_decoder,
        user_service,
        task_service,
        realtime,
    })
}

/// Runs the TaskHub server until `shutdown` resolves.
///
/// On shutdown the real-time engine closes every WebSocket so the graceful
/// drain is not held open by long-lived connections.
pub async fn run_server(
    config: AppConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), AppError> {
    info!("Starting TaskHub server...");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = build_state(config).await?;
    let realtime = state.realtime.clone();
    let repos = state.repos.clone();
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    info!(address = %addr, "TaskHub server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            realtime.shutdown();
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    if let Some(pool) = repos.pool {
        pool.close().await;
    }

    info!("TaskHub server stopped");
    Ok(())
}
