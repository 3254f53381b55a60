//! `AuthUser` extractor: reads the session token, validates it, and checks
//! that it has not been revoked.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use taskhub_core::error::AppError;
use taskhub_core::types::id::UserId;

use crate::error::ApiError;
use crate::state::AppState;

const PLEASE_AUTHENTICATE: &str = "Please authenticate.";

/// Authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Authenticated user.
    pub user_id: UserId,
    /// The token the request was made with.
    pub token: String,
}

/// Token from an `Authorization: Bearer` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookie_name = &state.config.auth.cookie.name;
        let token = CookieJar::from_headers(&parts.headers)
            .get(cookie_name)
            .map(|c| c.value().to_string())
            .filter(|t| !t.is_empty())
            .or_else(|| bearer_token(&parts.headers))
            .ok_or_else(|| AppError::authentication(PLEASE_AUTHENTICATE))?;

        let claims = state.jwt_decoder.decode(&token).map_err(|e| {
            debug!(error = %e, "Request token rejected");
            AppError::authentication(PLEASE_AUTHENTICATE)
        })?;

        if !state
            .user_service
            .is_token_active(claims.user_id(), &token)
            .await?
        {
            debug!(user_id = %claims.user_id(), "Revoked token presented");
            return Err(AppError::authentication(PLEASE_AUTHENTICATE).into());
        }

        Ok(AuthUser {
            user_id: claims.user_id(),
            token,
        })
    }
}
