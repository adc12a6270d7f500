//! The subscription table: topic key -> ordered subscriber list.
//!
//! Deliberately sloppy in the same ways the emulated service is: the same
//! client may appear under one topic more than once (double LISTEN appends
//! twice), unlisten removes only the first occurrence, emptied lists are
//! never pruned, and entries for closed connections linger until a send to
//! them fails. Tests depend on this fail-open behavior; do not tidy it.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::client::ClientId;

/// Shared topic -> subscribers map. One lock guards the whole table; every
/// LISTEN/UNLISTEN mutation and every emitter snapshot is a single critical
/// section, so no reader ever observes a half-mutated list.
#[derive(Default)]
pub struct SubscriptionTable {
    topics: Mutex<HashMap<String, Vec<ClientId>>>,
}

impl SubscriptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `client` to every listed topic. Duplicates are allowed.
    pub fn listen(&self, topics: &[String], client: &ClientId) {
        let mut map = self.topics.lock();
        for topic in topics {
            map.entry(topic.clone()).or_default().push(client.clone());
        }
    }

    /// Remove the first occurrence of `client` from each listed topic.
    /// Unknown topics and never-subscribed clients are ignored.
    pub fn unlisten(&self, topics: &[String], client: &ClientId) {
        let mut map = self.topics.lock();
        for topic in topics {
            if let Some(subscribers) = map.get_mut(topic) {
                if let Some(index) = subscribers.iter().position(|c| c == client) {
                    let _ = subscribers.remove(index);
                }
            }
        }
    }

    /// Snapshot every topic key containing `base` as a substring, with its
    /// subscriber list, skipping topics nobody is subscribed to. The
    /// substring match mirrors the emulated service and is looser than
    /// prefix matching; see the repository design notes.
    pub fn matching_snapshot(&self, base: &str) -> Vec<(String, Vec<ClientId>)> {
        let map = self.topics.lock();
        map.iter()
            .filter(|(topic, subscribers)| topic.contains(base) && !subscribers.is_empty())
            .map(|(topic, subscribers)| (topic.clone(), subscribers.clone()))
            .collect()
    }

    /// Number of subscriber entries (including duplicates) under a topic.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.lock().get(topic).map_or(0, Vec::len)
    }

    /// Whether the topic key exists at all, even with an empty list.
    pub fn has_topic(&self, topic: &str) -> bool {
        self.topics.lock().contains_key(topic)
    }
}
