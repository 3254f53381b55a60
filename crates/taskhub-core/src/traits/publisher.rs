//! Domain event publishing seam between services and the real-time engine.

use async_trait::async_trait;

use crate::events::DomainEvent;
use crate::result::AppResult;

/// Receives domain events after the originating mutation has committed.
///
/// Delivery is best-effort: implementations must not fail because a
/// recipient is offline. An `Err` means the publisher itself is unusable
/// (e.g. not started), which is a wiring bug.
#[async_trait]
pub trait EventPublisher: Send + Sync + std::fmt::Debug + 'static {
    /// Publish a single event.
    async fn publish(&self, event: DomainEvent) -> AppResult<()>;
}
