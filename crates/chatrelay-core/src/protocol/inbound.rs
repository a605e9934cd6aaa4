//! Inbound client frames.
//!
//! Legacy event names from socket.io clients (`new-user`,
//! `send-chat-message`) are accepted as aliases.

use serde::Deserialize;

use crate::error::{RelayError, Result};

/// One decoded client frame.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum ClientFrame {
    /// Join announcement carrying a display name. The name is not validated.
    #[serde(rename = "join", alias = "new-user")]
    Join { name: String },
    /// Text message to fan out to every other connection.
    #[serde(rename = "message", alias = "send-chat-message")]
    Message {
        #[serde(alias = "message")]
        text: String,
    },
}

/// Decode a text frame into a `ClientFrame`.
pub fn decode_client_frame(s: &str) -> Result<ClientFrame> {
    serde_json::from_str(s).map_err(|e| {
        tracing::trace!(error = %e, "client frame rejected");
        RelayError::BadRequest(format!("invalid frame: {e}"))
    })
}
