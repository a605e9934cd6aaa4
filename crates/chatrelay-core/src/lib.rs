//! chatrelay core: transport-agnostic wire protocol and error types.
//!
//! This crate defines the frames exchanged between clients and the relay and
//! the error surface shared by the gateway. It intentionally carries no
//! transport or runtime dependencies so the relay state machine can be driven
//! without a live socket.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed client input surfaces as `RelayError` instead of crashing the
//! process.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{Result, RelayError};
