//! Route definitions for the TaskHub HTTP API.
//!
//! REST routes are mounted under `/api`; the WebSocket upgrade lives at `/ws`.

use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::middleware::cors::build_cors_layer;
use crate::middleware::trace::build_trace_layer;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(user_routes())
        .merge(task_routes())
        .merge(health_routes());

    let ws_routes = Router::new().route("/ws", get(handlers::ws::ws_upgrade));

    let cors = build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .layer(build_trace_layer())
        .layer(cors)
        .with_state(state)
}

/// Account and session endpoints
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/signup", post(handlers::user::signup))
        .route("/users/login", post(handlers::user::login))
        .route("/users/logout", post(handlers::user::logout))
        .route(
            "/users/me",
            get(handlers::user::get_profile)
                .patch(handlers::user::update_profile)
                .delete(handlers::user::delete_profile),
        )
}

/// Owner-scoped task CRUD
fn task_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tasks",
            get(handlers::task::list_tasks).post(handlers::task::create_task),
        )
        .route(
            "/tasks/{id}",
            get(handlers::task::get_task)
                .patch(handlers::task::update_task)
                .delete(handlers::task::delete_task),
        )
}

/// Liveness and readiness
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}
