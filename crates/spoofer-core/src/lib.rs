//! Protocol and domain types for the Twitch PubSub spoofer.
//!
//! Everything in this crate is pure: wire frames, topic validation, event
//! kind configuration, and randomized payload synthesis. No sockets, no
//! shared state — the `spoofer-server` crate owns those.

pub mod config;
pub mod events;
pub mod frames;
pub mod topics;

pub use config::{ConfigError, EventSelection, SpooferConfig};
pub use events::EventKind;
pub use frames::{InboundFrame, MessagePayload, OutboundFrame};
