//! Transport layer (WebSocket).
//!
//! Exposes the WS upgrade handler, the pre-upgrade origin guard and the codec
//! that decodes frames once before they reach the relay.

pub mod codec;
pub mod handshake;
pub mod ws;
