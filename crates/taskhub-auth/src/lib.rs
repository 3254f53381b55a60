//! # taskhub-auth
//!
//! Credential plumbing for TaskHub.
//!
//! ## Modules
//!
//! - `jwt`: signed bearer token creation and validation
//! - `password`: Argon2id password hashing

pub mod jwt;
pub mod password;

pub use jwt::{Claims, IssuedToken, JwtDecoder, JwtEncoder};
pub use password::PasswordHasher;
