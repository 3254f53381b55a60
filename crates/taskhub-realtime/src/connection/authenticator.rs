//! Handshake gate: validates the bearer token of a new WebSocket before
//! the connection is admitted.
//!
//! The gate never touches the registry; admission is the caller's job.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use taskhub_auth::jwt::{Claims, JwtDecoder};
use taskhub_core::error::AppError;
use taskhub_core::types::id::UserId;

use crate::error::RealtimeError;

/// Verifies bearer tokens on behalf of the gate.
#[async_trait]
pub trait TokenVerifier: Send + Sync + std::fmt::Debug + 'static {
    /// Verify signature and expiry and return the claims.
    async fn verify(&self, token: &str) -> Result<Claims, AppError>;
}

#[async_trait]
impl TokenVerifier for JwtDecoder {
    async fn verify(&self, token: &str) -> Result<Claims, AppError> {
        self.decode(token)
    }
}

/// Identity attached to an admitted connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedConnection {
    /// Authenticated user.
    pub user_id: UserId,
    /// When the presented token expires.
    pub expires_at: DateTime<Utc>,
}

impl AuthenticatedConnection {
    /// Time left before the token expires; zero once it has.
    pub fn remaining(&self) -> Duration {
        (self.expires_at - Utc::now()).to_std().unwrap_or(Duration::ZERO)
    }
}

/// Authenticates WebSocket connection attempts.
#[derive(Debug, Clone)]
pub struct HandshakeGate {
    verifier: Arc<dyn TokenVerifier>,
    timeout: Duration,
}

impl HandshakeGate {
    /// Creates a new gate.
    pub fn new(verifier: Arc<dyn TokenVerifier>, timeout: Duration) -> Self {
        Self { verifier, timeout }
    }

    /// Authenticate one connection attempt.
    ///
    /// A missing or blank token is `Unauthorized`; a token that fails
    /// verification is `InvalidToken`.
    pub async fn authenticate(
        &self,
        token: Option<&str>,
    ) -> Result<AuthenticatedConnection, RealtimeError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(RealtimeError::Unauthorized)?;

        let claims = tokio::time::timeout(self.timeout, self.verifier.verify(token))
            .await
            .map_err(|_| RealtimeError::HandshakeTimeout)?
            .map_err(|e| {
                debug!(error = %e, "Handshake token rejected");
                RealtimeError::InvalidToken
            })?;

        Ok(AuthenticatedConnection {
            user_id: claims.user_id(),
            expires_at: claims.expires_at(),
        })
    }
}
