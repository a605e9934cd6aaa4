use std::net::SocketAddr;

use serde::Deserialize;
use chatrelay_core::error::{RelayError, Result};

use crate::realtime::{QoS, RelayOptions};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub relay: RelaySection,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            gateway: GatewaySection::default(),
            relay: RelaySection::default(),
        }
    }
}

impl RelayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(RelayError::UnsupportedVersion);
        }
        self.gateway.validate()?;
        self.relay.validate()?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_ws_path")]
    pub ws_path: String,

    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,

    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,

    /// Empty means any Origin is accepted.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            ws_path: default_ws_path(),
            max_frame_bytes: default_max_frame_bytes(),
            outbound_queue: default_outbound_queue(),
            allowed_origins: Vec::new(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !self.ws_path.starts_with('/') {
            return Err(RelayError::BadRequest(
                "gateway.ws_path must start with '/'".into(),
            ));
        }
        if !(64..=1_048_576).contains(&self.max_frame_bytes) {
            return Err(RelayError::BadRequest(
                "gateway.max_frame_bytes must be between 64 and 1048576".into(),
            ));
        }
        if !(1..=65_536).contains(&self.outbound_queue) {
            return Err(RelayError::BadRequest(
                "gateway.outbound_queue must be between 1 and 65536".into(),
            ));
        }
        if self.allowed_origins.iter().any(|o| o.trim().is_empty()) {
            return Err(RelayError::BadRequest(
                "gateway.allowed_origins must not contain empty entries".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            RelayError::BadRequest(format!("gateway.listen must be a valid SocketAddr: {e}"))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:3000".into()
}
fn default_ws_path() -> String {
    "/ws".into()
}
fn default_max_frame_bytes() -> usize {
    4096
}
fn default_outbound_queue() -> usize {
    256
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelaySection {
    #[serde(default = "default_true")]
    pub rebroadcast_rejoin: bool,

    #[serde(default)]
    pub delivery: DeliverySection,
}

impl Default for RelaySection {
    fn default() -> Self {
        Self {
            rebroadcast_rejoin: true,
            delivery: DeliverySection::default(),
        }
    }
}

impl RelaySection {
    pub fn validate(&self) -> Result<()> {
        self.delivery.validate()
    }

    pub fn options(&self) -> RelayOptions {
        RelayOptions {
            qos: self.delivery.qos(),
            rebroadcast_rejoin: self.rebroadcast_rejoin,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    #[default]
    Lossy,
    Reliable,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeliverySection {
    #[serde(default)]
    pub mode: DeliveryMode,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for DeliverySection {
    fn default() -> Self {
        Self {
            mode: DeliveryMode::default(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl DeliverySection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=60_000).contains(&self.timeout_ms) {
            return Err(RelayError::BadRequest(
                "relay.delivery.timeout_ms must be between 1 and 60000".into(),
            ));
        }
        Ok(())
    }

    pub fn qos(&self) -> QoS {
        match self.mode {
            DeliveryMode::Lossy => QoS::Lossy,
            DeliveryMode::Reliable => QoS::Reliable {
                timeout_ms: self.timeout_ms,
            },
        }
    }
}

fn default_timeout_ms() -> u64 {
    1500
}
