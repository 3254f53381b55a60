//! Authentication configuration.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

const PLACEHOLDER_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Token TTL in hours.
    #[serde(default = "default_token_ttl")]
    pub jwt_ttl_hours: u64,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Session cookie policy.
    #[serde(default)]
    pub cookie: CookieConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_ttl_hours: default_token_ttl(),
            password_min_length: default_password_min(),
            cookie: CookieConfig::default(),
        }
    }
}

impl AuthConfig {
    /// Whether the signing secret is still the shipped placeholder.
    pub fn uses_placeholder_secret(&self) -> bool {
        self.jwt_secret == PLACEHOLDER_SECRET
    }

    /// Token lifetime, or `None` when `jwt_ttl_hours` is zero or too large
    /// to represent.
    pub fn token_ttl(&self) -> Option<TimeDelta> {
        i64::try_from(self.jwt_ttl_hours)
            .ok()
            .and_then(TimeDelta::try_hours)
            .filter(|ttl| *ttl > TimeDelta::zero())
    }
}

/// Cookie policy for the REST session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    /// Cookie name.
    #[serde(default = "default_cookie_name")]
    pub name: String,
    /// `HttpOnly` attribute.
    #[serde(default = "default_true")]
    pub http_only: bool,
    /// `Secure` attribute.
    #[serde(default)]
    pub secure: bool,
    /// `SameSite` attribute: `"lax"`, `"strict"` or `"none"`.
    #[serde(default = "default_same_site")]
    pub same_site: String,
    /// `Max-Age` in seconds.
    #[serde(default = "default_cookie_max_age")]
    pub max_age_seconds: i64,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: default_cookie_name(),
            http_only: true,
            secure: false,
            same_site: default_same_site(),
            max_age_seconds: default_cookie_max_age(),
        }
    }
}

fn default_jwt_secret() -> String {
    PLACEHOLDER_SECRET.to_string()
}

fn default_token_ttl() -> u64 {
    7 * 24
}

fn default_password_min() -> usize {
    8
}

fn default_cookie_name() -> String {
    "token".to_string()
}

fn default_true() -> bool {
    true
}

fn default_same_site() -> String {
    "lax".to_string()
}

fn default_cookie_max_age() -> i64 {
    60 * 60 * 24 * 30
}
