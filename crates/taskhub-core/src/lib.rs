//! # taskhub-core
//!
//! Core crate for TaskHub. Contains repository and event-publishing traits,
//! configuration schemas, typed identifiers, domain events, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other TaskHub crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
