//! User handlers: signup, login, logout, profile.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use taskhub_core::config::CookieConfig;
use taskhub_core::error::AppError;
use taskhub_entity::User;
use taskhub_service::AuthSession;

use crate::dto::request::{LoginRequest, SignupRequest, UpdateProfileRequest};
use crate::dto::response::MessageResponse;
use crate::dto::validate;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/users/signup
pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthSession>), ApiError> {
    validate(&req)?;
    let session = state.user_service.signup(req.into()).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// POST /api/users/login
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthSession>), ApiError> {
    validate(&req)?;
    let session = state.user_service.login(req.into()).await?;
    let cookie = session_cookie(&state.config.auth.cookie, session.token.token.clone());
    Ok((jar.add(cookie), Json(session)))
}

/// POST /api/users/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), ApiError> {
    state.user_service.logout(auth.user_id, &auth.token).await?;
    let removal = Cookie::build((state.config.auth.cookie.name.clone(), "")).path("/");
    Ok((
        jar.remove(removal),
        Json(MessageResponse::new("Logged out successfully")),
    ))
}

/// GET /api/users/me
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.user_service.profile(auth.user_id).await?))
}

/// PATCH /api/users/me
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Json(req) = payload.map_err(invalid_updates)?;
    validate(&req)?;
    let user = state
        .user_service
        .update_profile(auth.user_id, req.into())
        .await?;
    Ok(Json(user))
}

/// DELETE /api/users/me
pub async fn delete_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<User>), ApiError> {
    let user = state.user_service.delete_account(auth.user_id).await?;
    let removal = Cookie::build((state.config.auth.cookie.name.clone(), "")).path("/");
    Ok((jar.remove(removal), Json(user)))
}

/// Map a body rejection on a PATCH route to the update error.
pub(crate) fn invalid_updates(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(_) => AppError::validation("Invalid updates!").into(),
        other => AppError::validation(other.body_text()).into(),
    }
}

fn session_cookie(config: &CookieConfig, token: String) -> Cookie<'static> {
    let same_site = match config.same_site.to_ascii_lowercase().as_str() {
        "strict" => SameSite::Strict,
        "none" => SameSite::None,
        _ => SameSite::Lax,
    };

    Cookie::build((config.name.clone(), token))
        .http_only(config.http_only)
        .secure(config.secure)
        .same_site(same_site)
        .path("/")
        .max_age(time::Duration::seconds(config.max_age_seconds))
        .build()
}
