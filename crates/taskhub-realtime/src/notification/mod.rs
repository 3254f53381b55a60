//! Notification formatting and dispatch.

pub mod dispatcher;
pub mod formatter;

pub use dispatcher::NotificationDispatcher;
