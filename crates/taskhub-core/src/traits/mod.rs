//! Core traits defined in `taskhub-core` and implemented by other crates.

pub mod publisher;
pub mod repository;

pub use publisher::EventPublisher;
pub use repository::{TaskRepository, UserRepository};
