//! Decode-once codec for the transport layer.
//!
//! - Text frames => `ClientFrame` (size-checked before parsing)
//! - Binary frames => rejected, the protocol is text only
//! - Ping/Pong/Close are surfaced for lifecycle management

use axum::extract::ws::Message;
use chatrelay_core::{
    error::{RelayError, Result},
    protocol::{decode_client_frame, ClientFrame},
};

#[derive(Debug)]
pub enum Inbound {
    Frame(ClientFrame),
    Ping,
    Pong,
    Close,
}

/// Cheap frame length, computed before any parsing.
pub fn frame_len(msg: &Message) -> usize {
    match msg {
        Message::Text(s) => s.len(),
        Message::Binary(b) => b.len(),
        Message::Ping(v) => v.len(),
        Message::Pong(v) => v.len(),
        Message::Close(_) => 0,
    }
}

pub fn decode(msg: Message, max_frame_bytes: usize) -> Result<Inbound> {
    let bytes_len = frame_len(&msg);
    match msg {
        Message::Text(s) => {
            if bytes_len > max_frame_bytes {
                return Err(RelayError::PayloadTooLarge {
                    len: bytes_len,
                    max: max_frame_bytes,
                });
            }
            let frame = decode_client_frame(&s)?;
            Ok(Inbound::Frame(frame))
        }
        Message::Binary(_) => Err(RelayError::BadRequest(
            "binary frames are not supported".into(),
        )),
        Message::Ping(_) => Ok(Inbound::Ping),
        Message::Pong(_) => Ok(Inbound::Pong),
        Message::Close(_) => Ok(Inbound::Close),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversize_text_is_rejected_before_parsing() {
        let big = format!(r#"{{"type":"message","text":"{}"}}"#, "x".repeat(200));
        let err = decode(Message::Text(big), 64).err();
        assert!(matches!(err, Some(RelayError::PayloadTooLarge { max: 64, .. })));
    }

    #[test]
    fn text_frame_decodes() {
        let msg = Message::Text(r#"{"type":"join","name":"Alice"}"#.to_string());
        match decode(msg, 4096) {
            Ok(Inbound::Frame(frame)) => {
                assert_eq!(frame, ClientFrame::Join { name: "Alice".into() });
            }
            other => unreachable!("unexpected {other:?}"),
        }
    }

    #[test]
    fn binary_is_bad_request() {
        let err = decode(Message::Binary(vec![1, 2, 3]), 4096).err();
        assert_eq!(
            err.map(|e| e.client_code().as_str()),
            Some("BAD_REQUEST")
        );
    }
}
