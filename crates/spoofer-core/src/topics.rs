//! Topic string validation.
//!
//! A topic is `"<topic-name>.<channel-id>"`, e.g.
//! `"channel-bits-events-v2.44322889"`. Only two topic names are recognized,
//! matching what the real PubSub edge exposes for bits and subscriptions.

/// Topic names the spoofer recognizes. These literals are load-bearing:
/// clients subscribe with them verbatim.
pub const SUPPORTED_TOPICS: &[&str] = &[
    "channel-bits-events-v2",
    "channel-subscribe-events-v1",
];

/// Whether a topic string is well-formed and supported.
///
/// Three rules, all required: the first `.` exists with a non-empty name
/// before it and a non-empty id after it, the name is one of
/// [`SUPPORTED_TOPICS`], and the id is entirely ASCII digits (no signs,
/// floats, or partial numeric prefixes).
pub fn is_valid_topic(topic: &str) -> bool {
    let Some((name, channel_id)) = split_topic(topic) else {
        return false;
    };
    SUPPORTED_TOPICS.contains(&name)
        && !channel_id.is_empty()
        && channel_id.bytes().all(|b| b.is_ascii_digit())
}

/// Split a topic at its first dot into `(name, channel_id)`.
/// Returns `None` when there is no dot or the name is empty.
pub fn split_topic(topic: &str) -> Option<(&str, &str)> {
    let dot = topic.find('.')?;
    if dot == 0 {
        return None;
    }
    Some((&topic[..dot], &topic[dot + 1..]))
}

/// The channel id portion of a topic key, if any.
pub fn channel_id(topic: &str) -> Option<&str> {
    split_topic(topic).map(|(_, id)| id)
}
