//! Outbound event encoding as observed by clients.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use chatrelay_core::protocol::{BroadcastEvent, DirectFrame};

#[test]
fn chat_message_attribution() {
    let ev = BroadcastEvent::MessageReceived {
        name: Some("Alice".into()),
        text: "hi".into(),
    };
    let v: serde_json::Value = serde_json::from_str(&ev.to_json().unwrap()).unwrap();
    assert_eq!(v["type"], "chat-message");
    assert_eq!(v["name"], "Alice");
    assert_eq!(v["text"], "hi");
}

#[test]
fn clients_can_decode_what_the_relay_emits() {
    let raw = r#"{"type":"chat-message","text":"anon"}"#;
    let ev: BroadcastEvent = serde_json::from_str(raw).unwrap();
    assert_eq!(
        ev,
        BroadcastEvent::MessageReceived { name: None, text: "anon".into() }
    );
}

#[test]
fn welcome_frame_shape() {
    let s = DirectFrame::Welcome { conn_id: 7 }.to_json().unwrap();
    assert_eq!(s, r#"{"type":"welcome","conn_id":7}"#);
}
