//! Wire protocol (JSON text frames tagged by `type`).
//!
//! - Inbound: frames a client sends on its own connection (`join`, `message`).
//! - Outbound: events fanned out to peers, plus direct frames addressed to a
//!   single connection (`welcome`, `error`).
//!
//! Decoding never panics: malformed input is reported as `RelayError`.

pub mod inbound;
pub mod outbound;

pub use inbound::{decode_client_frame, ClientFrame};
pub use outbound::{BroadcastEvent, DirectFrame};
