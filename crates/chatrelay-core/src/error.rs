//! Shared error type across chatrelay crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed frame.
    BadRequest,
    /// Frame exceeds the configured size limit.
    PayloadTooLarge,
    /// Rejected by gateway policy (e.g. origin).
    NotAllowed,
    /// Unsupported config or protocol version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON error frames.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ClientCode::NotAllowed => "NOT_ALLOWED",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("payload too large: {len} > {max} bytes")]
    PayloadTooLarge { len: usize, max: usize },
    #[error("not allowed: {0}")]
    NotAllowed(String),
    #[error("unsupported version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl RelayError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            RelayError::BadRequest(_) => ClientCode::BadRequest,
            RelayError::PayloadTooLarge { .. } => ClientCode::PayloadTooLarge,
            RelayError::NotAllowed(_) => ClientCode::NotAllowed,
            RelayError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            RelayError::Internal(_) => ClientCode::Internal,
        }
    }
}
