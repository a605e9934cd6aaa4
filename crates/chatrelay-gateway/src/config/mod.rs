//! Relay config loader (strict parsing).

pub mod schema;

use std::{env, fs, path::Path};

use chatrelay_core::error::{RelayError, Result};

pub use schema::{DeliveryMode, DeliverySection, GatewaySection, RelayConfig, RelaySection};

/// Env var naming the YAML config file.
pub const CONFIG_PATH_ENV: &str = "CHATRELAY_CONFIG";
/// Env var overriding `gateway.listen`.
pub const LISTEN_ENV: &str = "CHATRELAY_LISTEN";

const DEFAULT_CONFIG_PATH: &str = "chatrelay.yaml";

pub fn load_from_file(path: impl AsRef<Path>) -> Result<RelayConfig> {
    let path = path.as_ref();
    let s = fs::read_to_string(path).map_err(|e| {
        RelayError::Internal(format!("read config {} failed: {e}", path.display()))
    })?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<RelayConfig> {
    let cfg: RelayConfig = serde_yaml::from_str(s)
        .map_err(|e| RelayError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Resolve config the way the binary does, reading the process environment.
pub fn load_from_env() -> Result<RelayConfig> {
    load_with(|key| env::var(key).ok())
}

/// Resolve config from `lookup`: file from `CHATRELAY_CONFIG` (or
/// `chatrelay.yaml`), defaults when the default file is absent, then the
/// `CHATRELAY_LISTEN` override. An explicitly named file must exist.
pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<RelayConfig> {
    let explicit = lookup(CONFIG_PATH_ENV);
    let path = explicit.clone().unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let mut cfg = if Path::new(&path).exists() {
        tracing::info!(%path, "loading config");
        load_from_file(&path)?
    } else if explicit.is_some() {
        return Err(RelayError::Internal(format!("config file {path} not found")));
    } else {
        tracing::info!(%path, "no config file, using defaults");
        RelayConfig::default()
    };

    if let Some(listen) = lookup(LISTEN_ENV) {
        cfg.gateway.listen = listen;
        cfg.validate()?;
    }
    Ok(cfg)
}
