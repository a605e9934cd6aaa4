//! Realtime engine for the relay.
//!
//! Presence registry + connection set + broadcaster, driven by the lifecycle
//! handler (`Relay`).

pub mod core;
pub mod types;

pub use self::core::{Broadcaster, ConnectionSet, Peer, PresenceRegistry, Relay, RelayEvent, RelayOptions};
pub use types::{ConnId, Connection, DeliveryError, DeliveryReport, PreparedMsg, QoS};
