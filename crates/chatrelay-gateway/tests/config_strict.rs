#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use chatrelay_gateway::config::{self, DeliveryMode};
use chatrelay_gateway::realtime::QoS;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
gateway:
  listen: "0.0.0.0:3000"
  max_frame_byts: 123 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.gateway.listen, "0.0.0.0:3000");
    assert_eq!(cfg.gateway.ws_path, "/ws");
    assert!(cfg.gateway.allowed_origins.is_empty());
    assert!(cfg.relay.rebroadcast_rejoin);
    assert_eq!(cfg.relay.delivery.qos(), QoS::Lossy);
}

#[test]
fn full_config() {
    let ok = r#"
version: 1
gateway:
  listen: "127.0.0.1:9000"
  ws_path: "/chat"
  max_frame_bytes: 8192
  outbound_queue: 32
  allowed_origins: ["https://play.example.com"]
relay:
  rebroadcast_rejoin: false
  delivery:
    mode: reliable
    timeout_ms: 250
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.gateway.listen_addr().unwrap().port(), 9000);
    assert_eq!(cfg.gateway.outbound_queue, 32);
    assert_eq!(cfg.relay.delivery.mode, DeliveryMode::Reliable);

    let opts = cfg.relay.options();
    assert!(!opts.rebroadcast_rejoin);
    assert_eq!(opts.qos, QoS::Reliable { timeout_ms: 250 });
}

#[test]
fn wrong_version_is_unsupported() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn range_checks() {
    let cases = [
        "version: 1\ngateway:\n  listen: \"not-an-addr\"\n",
        "version: 1\ngateway:\n  ws_path: \"ws\"\n",
        "version: 1\ngateway:\n  max_frame_bytes: 1\n",
        "version: 1\ngateway:\n  outbound_queue: 0\n",
        "version: 1\ngateway:\n  allowed_origins: [\"\"]\n",
        "version: 1\nrelay:\n  delivery:\n    timeout_ms: 0\n",
        "version: 1\nrelay:\n  delivery:\n    mode: eventually\n",
    ];
    for yaml in cases {
        let err = config::load_from_str(yaml).expect_err(yaml);
        assert_eq!(err.client_code().as_str(), "BAD_REQUEST", "{yaml}");
    }
}

fn example_path() -> String {
    format!("{}/../../chatrelay.example.yaml", env!("CARGO_MANIFEST_DIR"))
}

fn env_of(vars: &[(&str, String)]) -> impl Fn(&str) -> Option<String> {
    let vars: Vec<(String, String)> = vars.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
    move |key| vars.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
}

#[test]
fn shipped_example_config_loads() {
    let cfg = config::load_from_file(example_path()).expect("example must load");
    assert_eq!(cfg.gateway.listen, "0.0.0.0:3000");
    assert_eq!(cfg.gateway.ws_path, "/ws");
    assert_eq!(cfg.relay.delivery.qos(), QoS::Lossy);
}

#[test]
fn explicit_config_path_is_used() {
    let cfg = config::load_with(env_of(&[(config::CONFIG_PATH_ENV, example_path())])).unwrap();
    assert_eq!(cfg.gateway.outbound_queue, 256);
}

#[test]
fn missing_explicit_config_fails() {
    let missing = format!("{}/does-not-exist.yaml", env!("CARGO_MANIFEST_DIR"));
    let err = config::load_with(env_of(&[(config::CONFIG_PATH_ENV, missing)])).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "INTERNAL");
}

#[test]
fn missing_default_config_falls_back_to_defaults() {
    let cfg = config::load_with(env_of(&[])).expect("defaults");
    assert_eq!(cfg.gateway.listen, "0.0.0.0:3000");
    assert!(cfg.relay.rebroadcast_rejoin);
}

#[test]
fn listen_override_is_applied_and_validated() {
    let cfg = config::load_with(env_of(&[(config::LISTEN_ENV, "127.0.0.1:4100".to_string())])).unwrap();
    assert_eq!(cfg.gateway.listen_addr().unwrap().port(), 4100);

    let err = config::load_with(env_of(&[(config::LISTEN_ENV, "nope".to_string())]))
        .expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}
