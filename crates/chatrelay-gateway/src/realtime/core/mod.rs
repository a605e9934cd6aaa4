//! Realtime core components.
//!
//! Connection set (transport level), presence registry (announced names),
//! broadcaster (fan-out) and the lifecycle handler tying them together.

mod broadcast;
mod connections;
mod lifecycle;
mod registry;

pub use broadcast::Broadcaster;
pub use connections::{ConnectionSet, Peer};
pub use lifecycle::{Relay, RelayEvent, RelayOptions};
pub use registry::PresenceRegistry;
