//! chatrelay gateway library entry.
//!
//! This crate wires config, the WebSocket transport and the realtime relay
//! (presence registry, connection set, broadcaster, lifecycle handler) into
//! one server. It is consumed by the binary (`main.rs`) and by integration
//! tests.

pub mod app_state;
pub mod config;
pub mod router;
pub mod transport;
pub mod realtime;
