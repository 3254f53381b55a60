//! # taskhub-service
//!
//! Business logic for TaskHub. Services own the rules (ownership, token
//! revocation, field limits) and publish domain events once a mutation has
//! been committed.

pub mod task;
pub mod user;

pub use task::{CreateTaskInput, TaskService, UpdateTaskInput};
pub use user::{AuthSession, LoginInput, SignupInput, UpdateProfileInput, UserService};
