//! Event kinds and the randomized payload synthesizer.
//!
//! Payloads imitate what the PubSub edge pushes for bits and subscription
//! events: plausible field names, bounded random values, placeholder text.
//! Synthesis is pure given the `Rng`, so one payload can be minted per topic
//! per tick and shared across every subscriber of that topic.

use rand::Rng;
use serde::Serialize;

use crate::config::ConfigError;

const CHANNEL_NAME_POOL: &str = "TheLongestNameAllowedIs25";
const CHEER_USER_POOL: &str = "ThisPersonCheeredAnAmount";
const SUB_USER_POOL: &str = "ThisPersonSubscribed";
const CHAT_MESSAGE_POOL: &str = "cheer10000 New badge hype! But what if the message were much, \
     much longer? I don't know what the maximum length for messages \
     is on Twitch, but I will make this as long as I think is reasonable \
     to design around. Something like this oughta be ok.";
const SUB_MESSAGE_POOL: &str = "Sub, sub sub sub! But what if the message were much, \
     much longer? I don't know what the maximum length for messages \
     is on Twitch, but I will make this as long as I think is reasonable \
     to design around. Something like this oughta be ok.";

/// One spoofable (or at least mappable) Twitch event kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Bits,
    BitsAnonymous,
    BitsEntitled,
    Subscription,
    Resubscription,
    GiftSubscription,
}

/// Kinds the synthesizer can actually produce. Resubscription and gift
/// subscription payloads are not fleshed out yet, so configuring them is a
/// construction error.
pub const SUPPORTED_EVENTS: &[EventKind] = &[
    EventKind::Bits,
    EventKind::BitsAnonymous,
    EventKind::BitsEntitled,
    EventKind::Subscription,
];

impl EventKind {
    /// The topic name this kind is broadcast under.
    pub fn topic_name(self) -> &'static str {
        match self {
            Self::Bits | Self::BitsAnonymous | Self::BitsEntitled => "channel-bits-events-v2",
            Self::Subscription | Self::Resubscription | Self::GiftSubscription => {
                "channel-subscribe-events-v1"
            }
        }
    }

    pub fn is_supported(self) -> bool {
        SUPPORTED_EVENTS.contains(&self)
    }

    /// CLI/config token for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bits => "bits",
            Self::BitsAnonymous => "bits-anonymous",
            Self::BitsEntitled => "bits-entitled",
            Self::Subscription => "subscription",
            Self::Resubscription => "resubscription",
            Self::GiftSubscription => "gift-subscription",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bits" => Ok(Self::Bits),
            "bits-anonymous" => Ok(Self::BitsAnonymous),
            "bits-entitled" => Ok(Self::BitsEntitled),
            "subscription" => Ok(Self::Subscription),
            "resubscription" => Ok(Self::Resubscription),
            "gift-subscription" => Ok(Self::GiftSubscription),
            other => Err(ConfigError::UnknownEvent(other.to_string())),
        }
    }
}

/// Synthesize one event payload for `kind`, addressed to `channel_id`.
///
/// The result is the inner document that gets double-encoded into a MESSAGE
/// frame's `data.message` string.
pub fn synthesize(kind: EventKind, channel_id: &str, rng: &mut impl Rng) -> serde_json::Value {
    let value = match kind {
        EventKind::Bits => serde_json::to_value(bits_event(channel_id, false, false, rng)),
        EventKind::BitsAnonymous => serde_json::to_value(bits_event(channel_id, true, false, rng)),
        EventKind::BitsEntitled => serde_json::to_value(bits_event(channel_id, false, true, rng)),
        EventKind::Subscription | EventKind::Resubscription | EventKind::GiftSubscription => {
            serde_json::to_value(sub_event(channel_id, rng))
        }
    };
    // Serialization of these plain structs cannot fail
    value.unwrap_or_else(|_| serde_json::Value::Null)
}

#[derive(Debug, Serialize)]
struct BitsEvent {
    data: BitsEventData,
    /// `true` for anonymous cheers, otherwise literally `null` — the real
    /// payload never omits the field.
    is_anonymous: Option<bool>,
    message_id: String,
    message_type: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct BitsEventData {
    badge_entitlement: Option<BadgeEntitlement>,
    bits_used: u32,
    channel_id: String,
    channel_name: String,
    chat_message: String,
    context: &'static str,
    time: String,
    total_bits_used: u32,
    user_id: String,
    user_name: String,
}

#[derive(Debug, Serialize)]
struct BadgeEntitlement {
    new_version: u32,
    previous_version: u32,
}

fn bits_event(
    channel_id: &str,
    is_anonymous: bool,
    is_entitled: bool,
    rng: &mut impl Rng,
) -> BitsEvent {
    // TODO: draw badge versions from the real tier table instead of fixing
    // the 10k -> 25k transition
    let badge_entitlement = is_entitled.then(|| BadgeEntitlement {
        new_version: 25_000,
        previous_version: 10_000,
    });

    BitsEvent {
        data: BitsEventData {
            badge_entitlement,
            bits_used: rng.gen_range(0..999_999),
            channel_id: channel_id.to_string(),
            channel_name: clip(CHANNEL_NAME_POOL, 4, 25, rng),
            chat_message: clip(CHAT_MESSAGE_POOL, 6, 280, rng),
            context: "cheer",
            time: now_millis(),
            total_bits_used: rng.gen_range(0..999_999),
            user_id: rng.gen_range(0..99_999_999u32).to_string(),
            user_name: clip(CHEER_USER_POOL, 4, 25, rng),
        },
        is_anonymous: if is_anonymous { Some(true) } else { None },
        message_id: uuid::Uuid::now_v7().to_string(),
        message_type: "bits_event",
        version: "1.0",
    }
}

/// Minimal viable subscription payload. Covers the plain subscription case;
/// resub/gift variants would need `context` and gift fields before they can
/// be promoted into [`SUPPORTED_EVENTS`].
#[derive(Debug, Serialize)]
struct SubscriptionEvent {
    channel_id: String,
    channel_name: String,
    context: &'static str,
    #[serde(rename = "cumulative-months")]
    cumulative_months: u32,
    display_name: &'static str,
    #[serde(rename = "streak-months")]
    streak_months: u32,
    sub_message: SubMessage,
    sub_plan: &'static str,
    sub_plan_name: &'static str,
    time: String,
    user_id: String,
    user_name: String,
}

#[derive(Debug, Serialize)]
struct SubMessage {
    emotes: Vec<serde_json::Value>,
    message: String,
}

fn sub_event(channel_id: &str, rng: &mut impl Rng) -> SubscriptionEvent {
    SubscriptionEvent {
        channel_id: channel_id.to_string(),
        channel_name: clip(CHANNEL_NAME_POOL, 4, 25, rng),
        context: "sub",
        cumulative_months: rng.gen_range(0..24),
        display_name: "DisplayThisName",
        streak_months: rng.gen_range(0..24),
        sub_message: SubMessage {
            emotes: Vec::new(),
            message: clip(SUB_MESSAGE_POOL, 6, 280, rng),
        },
        sub_plan: "Prime",
        sub_plan_name: "Channel Subscription (example_channel)",
        time: now_millis(),
        user_id: rng.gen_range(0..99_999_999u32).to_string(),
        user_name: clip(SUB_USER_POOL, 4, 20, rng),
    }
}

/// Random-length prefix of a placeholder string, `lo..hi` chars.
fn clip(pool: &str, lo: usize, hi: usize, rng: &mut impl Rng) -> String {
    let len = rng.gen_range(lo..hi);
    pool.chars().take(len).collect()
}

fn now_millis() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn kind_topic_mapping() {
        assert_eq!(EventKind::Bits.topic_name(), "channel-bits-events-v2");
        assert_eq!(EventKind::BitsAnonymous.topic_name(), "channel-bits-events-v2");
        assert_eq!(EventKind::BitsEntitled.topic_name(), "channel-bits-events-v2");
        assert_eq!(EventKind::Subscription.topic_name(), "channel-subscribe-events-v1");
        assert_eq!(EventKind::Resubscription.topic_name(), "channel-subscribe-events-v1");
        assert_eq!(EventKind::GiftSubscription.topic_name(), "channel-subscribe-events-v1");
    }

    #[test]
    fn supported_set_excludes_unfinished_kinds() {
        assert!(EventKind::Bits.is_supported());
        assert!(EventKind::Subscription.is_supported());
        assert!(!EventKind::Resubscription.is_supported());
        assert!(!EventKind::GiftSubscription.is_supported());
    }

    #[test]
    fn kind_tokens_round_trip() {
        for kind in [
            EventKind::Bits,
            EventKind::BitsAnonymous,
            EventKind::BitsEntitled,
            EventKind::Subscription,
            EventKind::Resubscription,
            EventKind::GiftSubscription,
        ] {
            assert_eq!(kind.as_str().parse::<EventKind>().unwrap(), kind);
        }
        assert!("cheer".parse::<EventKind>().is_err());
    }

    #[test]
    fn bits_payload_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let payload = synthesize(EventKind::Bits, "123", &mut rng);

        assert_eq!(payload["message_type"], "bits_event");
        assert_eq!(payload["version"], "1.0");
        assert!(payload["is_anonymous"].is_null());
        assert!(payload["data"]["badge_entitlement"].is_null());
        assert_eq!(payload["data"]["channel_id"], "123");
        assert_eq!(payload["data"]["context"], "cheer");

        let bits = payload["data"]["bits_used"].as_u64().unwrap();
        assert!(bits < 999_999);
        let total = payload["data"]["total_bits_used"].as_u64().unwrap();
        assert!(total < 999_999);

        // user_id is a numeric string, not a number
        let user_id = payload["data"]["user_id"].as_str().unwrap();
        assert!(user_id.parse::<u64>().is_ok());
        assert!(!payload["message_id"].as_str().unwrap().is_empty());
    }

    #[test]
    fn anonymous_bits_set_the_flag() {
        let mut rng = StdRng::seed_from_u64(7);
        let payload = synthesize(EventKind::BitsAnonymous, "123", &mut rng);
        assert_eq!(payload["is_anonymous"], true);
        assert!(payload["data"]["badge_entitlement"].is_null());
    }

    #[test]
    fn entitled_bits_carry_badge_versions() {
        let mut rng = StdRng::seed_from_u64(7);
        let payload = synthesize(EventKind::BitsEntitled, "123", &mut rng);
        assert!(payload["is_anonymous"].is_null());
        assert_eq!(payload["data"]["badge_entitlement"]["new_version"], 25_000);
        assert_eq!(payload["data"]["badge_entitlement"]["previous_version"], 10_000);
    }

    #[test]
    fn subscription_payload_shape() {
        let mut rng = StdRng::seed_from_u64(11);
        let payload = synthesize(EventKind::Subscription, "456", &mut rng);

        assert_eq!(payload["channel_id"], "456");
        assert_eq!(payload["context"], "sub");
        assert_eq!(payload["sub_plan"], "Prime");
        assert!(payload["cumulative-months"].as_u64().unwrap() < 24);
        assert!(payload["streak-months"].as_u64().unwrap() < 24);
        assert!(payload["sub_message"]["emotes"].as_array().unwrap().is_empty());
        assert!(!payload["sub_message"]["message"].as_str().unwrap().is_empty());
    }

    #[test]
    fn same_seed_same_payload_random_fields() {
        let a = synthesize(EventKind::Bits, "123", &mut StdRng::seed_from_u64(42));
        let b = synthesize(EventKind::Bits, "123", &mut StdRng::seed_from_u64(42));
        // `time` and `message_id` are wall-clock/uuid, so compare the drawn fields
        assert_eq!(a["data"]["bits_used"], b["data"]["bits_used"]);
        assert_eq!(a["data"]["user_name"], b["data"]["user_name"]);
        assert_eq!(a["data"]["chat_message"], b["data"]["chat_message"]);
    }

    #[test]
    fn placeholder_lengths_are_bounded() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let payload = synthesize(EventKind::Bits, "1", &mut rng);
            let name = payload["data"]["channel_name"].as_str().unwrap();
            assert!(name.len() >= 4 && name.len() < 25, "bad length {}", name.len());
            let msg = payload["data"]["chat_message"].as_str().unwrap();
            assert!(msg.len() >= 6);
        }
    }
}
