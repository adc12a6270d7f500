//! The protocol state machine: one inbound frame in, one outbound frame out.
//!
//! Every validation failure is soft — it comes back as the `error` string of
//! a RESPONSE frame and the connection stays open. The real service stays
//! silent on unknown frame types; we answer with a diagnostic instead to
//! make client bugs visible in tests. That divergence is intentional.

use spoofer_core::frames::{InboundFrame, OutboundFrame};
use spoofer_core::topics;

use crate::client::ClientId;
use crate::subscriptions::SubscriptionTable;

/// Error string for a LISTEN with no usable topics list, mimicking the
/// HTTP-flavored error the real edge returns.
pub const ERR_NO_TOPICS: &str = "unexpected http status 400";
/// Error string for a LISTEN naming at least one malformed/unsupported topic.
pub const ERR_INVALID_TOPIC: &str = "Invalid Topic";
/// Diagnostic for frame types the real service would ignore.
pub const ERR_BAD_MESSAGE: &str = "ERR_BADMESSAGE: Twitch would not have sent this response";

/// Handle one raw text frame from `client`, mutating the subscription table
/// as required, and produce the reply frame.
///
/// Frames that fail to parse (bad JSON, missing `type`, wrongly-shaped
/// fields) are treated like an unknown frame type: they draw the BADMESSAGE
/// response with an empty nonce, and the connection is left alone.
pub fn handle_frame(raw: &str, client: &ClientId, table: &SubscriptionTable) -> OutboundFrame {
    let Ok(frame) = serde_json::from_str::<InboundFrame>(raw) else {
        tracing::debug!(client_id = %client, "unparseable frame");
        return OutboundFrame::response(None, ERR_BAD_MESSAGE);
    };
    handle(frame, client, table)
}

fn handle(frame: InboundFrame, client: &ClientId, table: &SubscriptionTable) -> OutboundFrame {
    match frame.kind.as_str() {
        // PONG carries no nonce and no error, even when the PING had one
        "PING" => OutboundFrame::Pong,
        "LISTEN" => listen(&frame, client, table),
        "UNLISTEN" => {
            // Fail open: iterate whatever topics were sent, skip anything
            // unknown, and always report success
            if let Some(topics) = frame.data.as_ref().and_then(|d| d.topics.as_deref()) {
                table.unlisten(topics, client);
            }
            OutboundFrame::response(frame.nonce, "")
        }
        other => {
            tracing::debug!(client_id = %client, kind = other, "unknown frame type");
            OutboundFrame::response(frame.nonce, ERR_BAD_MESSAGE)
        }
    }
}

fn listen(frame: &InboundFrame, client: &ClientId, table: &SubscriptionTable) -> OutboundFrame {
    let topics = frame
        .data
        .as_ref()
        .and_then(|d| d.topics.as_deref())
        .unwrap_or_default();

    if topics.is_empty() {
        return OutboundFrame::response(frame.nonce.clone(), ERR_NO_TOPICS);
    }
    if !topics.iter().all(|t| topics::is_valid_topic(t)) {
        return OutboundFrame::response(frame.nonce.clone(), ERR_INVALID_TOPIC);
    }

    table.listen(topics, client);
    tracing::debug!(client_id = %client, count = topics.len(), "subscribed");
    OutboundFrame::response(frame.nonce.clone(), "")
}
