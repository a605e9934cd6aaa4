//! Pre-upgrade origin guard.
//!
//! Browsers always send `Origin` on a WebSocket upgrade; when an allowlist is
//! configured, browser origins outside it are refused with 403 before the
//! upgrade. Requests without `Origin` (native clients) are let through.

use chatrelay_core::error::{RelayError, Result};

#[derive(Debug, Clone, Default)]
pub struct OriginGuard {
    allowed: Vec<String>,
}

impl OriginGuard {
    pub fn new(allowed: &[String]) -> Self {
        Self {
            allowed: allowed.iter().map(|o| normalize(o).to_string()).collect(),
        }
    }

    pub fn enabled(&self) -> bool {
        !self.allowed.is_empty()
    }

    pub fn check(&self, origin: Option<&str>) -> Result<()> {
        if !self.enabled() {
            return Ok(());
        }
        let Some(origin) = origin else {
            return Ok(());
        };
        let origin = normalize(origin);
        if self.allowed.iter().any(|a| a.eq_ignore_ascii_case(origin)) {
            Ok(())
        } else {
            Err(RelayError::NotAllowed(format!("origin {origin}")))
        }
    }
}

fn normalize(origin: &str) -> &str {
    origin.trim().trim_end_matches('/')
}
