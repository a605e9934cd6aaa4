//! Outbound frames.
//!
//! `BroadcastEvent` is what peers observe; `DirectFrame` only ever goes to
//! the connection it concerns. Both serialize once per fan-out.

use serde::{Deserialize, Serialize};

use crate::error::{ClientCode, RelayError, Result};

/// Event delivered to every connection except its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BroadcastEvent {
    /// A connection announced (or re-announced) a display name.
    PeerJoined { name: String },
    /// A connection sent text. `name` is absent when the sender never announced.
    #[serde(rename = "chat-message")]
    MessageReceived {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        text: String,
    },
    /// An announced connection went away.
    PeerLeft { name: String },
}

impl BroadcastEvent {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            BroadcastEvent::PeerJoined { .. } => "peer-joined",
            BroadcastEvent::MessageReceived { .. } => "chat-message",
            BroadcastEvent::PeerLeft { .. } => "peer-left",
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| RelayError::Internal(format!("json encode failed: {e}")))
    }
}

/// Frame addressed to a single connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DirectFrame {
    /// Sent once after upgrade with the transport-assigned id.
    Welcome { conn_id: u64 },
    /// A frame from this connection was rejected; the connection stays open.
    Error { code: String, msg: String },
}

impl DirectFrame {
    pub fn error(code: ClientCode, msg: impl Into<String>) -> Self {
        DirectFrame::Error {
            code: code.as_str().to_string(),
            msg: msg.into(),
        }
    }

    pub fn from_error(err: &RelayError) -> Self {
        Self::error(err.client_code(), err.to_string())
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| RelayError::Internal(format!("json encode failed: {e}")))
    }
}
