//! Shared application state for the relay gateway.
//!
//! The `Relay` is created once here at startup and dropped with the last
//! clone of the state at shutdown.

use std::sync::Arc;

use chatrelay_core::error::Result;

use crate::config::RelayConfig;
use crate::realtime::Relay;
use crate::transport::handshake::OriginGuard;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    relay: Arc<Relay>,
}

struct AppStateInner {
    cfg: RelayConfig,
    origin_guard: OriginGuard,
}

impl AppState {
    /// Build application state.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: RelayConfig) -> Result<Self> {
        cfg.validate()?;

        let origin_guard = OriginGuard::new(&cfg.gateway.allowed_origins);
        if origin_guard.enabled() {
            tracing::info!(origins = ?cfg.gateway.allowed_origins, "origin allowlist active");
        }

        let opts = cfg.relay.options();
        tracing::info!(qos = ?opts.qos, rebroadcast_rejoin = opts.rebroadcast_rejoin, "relay configured");
        let relay = Arc::new(Relay::new(opts));

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, origin_guard }),
            relay,
        })
    }

    pub fn cfg(&self) -> &RelayConfig {
        &self.inner.cfg
    }

    pub fn origin_guard(&self) -> &OriginGuard {
        &self.inner.origin_guard
    }

    pub fn relay(&self) -> Arc<Relay> {
        Arc::clone(&self.relay)
    }
}
