//! Connection management: handles, registry, handshake gate, lifecycle and heartbeat.

pub mod authenticator;
pub mod handle;
pub mod heartbeat;
pub mod lifecycle;
pub mod registry;

pub use authenticator::{AuthenticatedConnection, HandshakeGate, TokenVerifier};
pub use handle::{ConnectionHandle, ConnectionId};
pub use heartbeat::Heartbeat;
pub use lifecycle::LifecycleHooks;
pub use registry::ConnectionRegistry;
