//! User accounts and sessions.

pub mod service;

pub use service::{AuthSession, LoginInput, SignupInput, UpdateProfileInput, UserService};
