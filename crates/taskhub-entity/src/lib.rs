//! # taskhub-entity
//!
//! Domain entity models for TaskHub: users and their tasks.

pub mod task;
pub mod user;

pub use task::{Task, TaskChanges};
pub use user::{User, UserChanges};
