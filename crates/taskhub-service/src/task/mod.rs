//! Owner-scoped task management.

pub mod service;

pub use service::{CreateTaskInput, TaskService, UpdateTaskInput};
