//! The emission scheduler: a recurring timer that fabricates events for
//! subscribed topics.

use std::sync::Arc;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use spoofer_core::events::{self, EventKind};
use spoofer_core::frames::OutboundFrame;
use spoofer_core::topics;

use crate::client::ClientRegistry;
use crate::subscriptions::SubscriptionTable;

/// Spawn the emitter task. Each tick picks one configured kind at random and
/// broadcasts a synthesized payload to every matching subscription. Aborting
/// the returned handle guarantees no further ticks fire.
pub fn start(
    kinds: Vec<EventKind>,
    frequency: Duration,
    table: Arc<SubscriptionTable>,
    registry: Arc<ClientRegistry>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(frequency);
        ticker.tick().await; // consume the immediate first tick
        loop {
            ticker.tick().await;
            emit_tick(&kinds, &table, &registry, &mut rand::thread_rng());
        }
    })
}

/// One scheduler tick.
///
/// Topic keys are matched by substring containment of the kind's topic name,
/// exactly as the emulated service does. A channel id that is a numeric
/// substring of another could therefore see cross-talk; faithfully kept, not
/// corrected (see DESIGN.md).
///
/// One payload is synthesized per matching topic and the identical serialized
/// frame goes to every subscriber of that topic, duplicates included. The
/// subscriber list is snapshotted under the table lock; sends happen outside
/// it and failures (closed/slow clients) are ignored.
pub fn emit_tick(
    kinds: &[EventKind],
    table: &SubscriptionTable,
    registry: &ClientRegistry,
    rng: &mut impl Rng,
) {
    let Some(&kind) = kinds.choose(rng) else {
        return;
    };

    for (topic, subscribers) in table.matching_snapshot(kind.topic_name()) {
        let channel = topics::channel_id(&topic).unwrap_or_default();
        let payload = events::synthesize(kind, channel, rng);
        let Ok(body) = serde_json::to_string(&payload) else {
            continue;
        };
        let Ok(frame) = serde_json::to_string(&OutboundFrame::message(topic.clone(), body)) else {
            continue;
        };

        let mut delivered = 0usize;
        for client in &subscribers {
            if registry.send_to(client, frame.clone()) {
                delivered += 1;
            }
        }
        tracing::trace!(kind = %kind, topic = %topic, delivered, "emitted event");
    }
}
