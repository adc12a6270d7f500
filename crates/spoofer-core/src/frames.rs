//! Wire frames exchanged over a PubSub connection.
//!
//! Inbound frames are lenient: unknown `type` strings parse fine (the
//! handler answers them with a diagnostic RESPONSE) and extra fields such as
//! `auth_token` are ignored. Outbound frames are strict about shape — a PONG
//! is exactly `{"type":"PONG"}`, nothing else.

use serde::{Deserialize, Serialize};

/// A frame received from a client.
#[derive(Clone, Debug, Deserialize)]
pub struct InboundFrame {
    #[serde(rename = "type")]
    pub kind: String,
    pub nonce: Option<String>,
    pub data: Option<InboundData>,
}

/// The `data` block of an inbound frame. `auth_token` and friends are
/// accepted but dropped.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct InboundData {
    pub topics: Option<Vec<String>>,
}

/// A frame sent to a client.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type")]
pub enum OutboundFrame {
    #[serde(rename = "PONG")]
    Pong,
    #[serde(rename = "RESPONSE")]
    Response { nonce: String, error: String },
    #[serde(rename = "MESSAGE")]
    Message { data: MessagePayload },
}

/// Payload of a MESSAGE frame. `message` is itself a JSON document,
/// serialized into a string — the real service double-encodes event bodies.
#[derive(Clone, Debug, Serialize)]
pub struct MessagePayload {
    pub topic: String,
    pub message: String,
}

impl OutboundFrame {
    /// A RESPONSE echoing the inbound nonce, or `""` when none was sent.
    pub fn response(nonce: Option<String>, error: impl Into<String>) -> Self {
        Self::Response {
            nonce: nonce.unwrap_or_default(),
            error: error.into(),
        }
    }

    /// A MESSAGE frame wrapping an already-serialized event body.
    pub fn message(topic: impl Into<String>, body: String) -> Self {
        Self::Message {
            data: MessagePayload {
                topic: topic.into(),
                message: body,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_listen_frame() {
        let json = r#"{"type":"LISTEN","nonce":"abc","data":{"auth_token":"t","topics":["channel-bits-events-v2.123"]}}"#;
        let frame: InboundFrame = serde_json::from_str(json).unwrap();
        assert_eq!(frame.kind, "LISTEN");
        assert_eq!(frame.nonce.as_deref(), Some("abc"));
        let topics = frame.data.unwrap().topics.unwrap();
        assert_eq!(topics, vec!["channel-bits-events-v2.123"]);
    }

    #[test]
    fn parse_frame_without_data_or_nonce() {
        let frame: InboundFrame = serde_json::from_str(r#"{"type":"PING"}"#).unwrap();
        assert_eq!(frame.kind, "PING");
        assert!(frame.nonce.is_none());
        assert!(frame.data.is_none());
    }

    #[test]
    fn parse_rejects_missing_type() {
        assert!(serde_json::from_str::<InboundFrame>(r#"{"nonce":"x"}"#).is_err());
    }

    #[test]
    fn pong_serializes_with_exactly_one_key() {
        let json = serde_json::to_value(OutboundFrame::Pong).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(obj["type"], "PONG");
    }

    #[test]
    fn response_echoes_nonce_or_defaults_empty() {
        let with = OutboundFrame::response(Some("n1".into()), "");
        let json = serde_json::to_value(&with).unwrap();
        assert_eq!(json["type"], "RESPONSE");
        assert_eq!(json["nonce"], "n1");
        assert_eq!(json["error"], "");

        let without = OutboundFrame::response(None, "Invalid Topic");
        let json = serde_json::to_value(&without).unwrap();
        assert_eq!(json["nonce"], "");
        assert_eq!(json["error"], "Invalid Topic");
    }

    #[test]
    fn message_frame_shape() {
        let frame = OutboundFrame::message("channel-bits-events-v2.123", r#"{"k":1}"#.to_string());
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "MESSAGE");
        assert_eq!(json["data"]["topic"], "channel-bits-events-v2.123");
        // Inner body stays a string, not an object
        assert!(json["data"]["message"].is_string());
        let inner: serde_json::Value =
            serde_json::from_str(json["data"]["message"].as_str().unwrap()).unwrap();
        assert_eq!(inner["k"], 1);
    }
}
