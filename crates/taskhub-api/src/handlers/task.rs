//! Task handlers. Every route is owner-scoped.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use taskhub_core::types::id::TaskId;
use taskhub_entity::Task;

use crate::dto::request::{CreateTaskRequest, TaskListQuery, UpdateTaskRequest};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::handlers::user::invalid_updates;
use crate::state::AppState;

/// POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let task = state.task_service.create(auth.user_id, req.into()).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/tasks?completed=
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = state
        .task_service
        .list(auth.user_id, query.completed)
        .await?;
    Ok(Json(tasks))
}

/// GET /api/tasks/{id}
pub async fn get_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<TaskId>,
) -> Result<Json<Task>, ApiError> {
    Ok(Json(state.task_service.get(auth.user_id, id).await?))
}

/// PATCH /api/tasks/{id}
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<TaskId>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let Json(req) = payload.map_err(invalid_updates)?;
    let task = state
        .task_service
        .update(auth.user_id, id, req.into())
        .await?;
    Ok(Json(task))
}

/// DELETE /api/tasks/{id}
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<TaskId>,
) -> Result<Json<Task>, ApiError> {
    Ok(Json(state.task_service.delete(auth.user_id, id).await?))
}
