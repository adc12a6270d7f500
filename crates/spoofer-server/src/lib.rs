//! WebSocket server emulating the Twitch PubSub edge.
//!
//! Clients connect, LISTEN/UNLISTEN on topics, and receive synthesized
//! MESSAGE frames at a configurable cadence. See `spoofer-core` for the wire
//! format and payload synthesis.

pub mod client;
pub mod emitter;
pub mod handler;
pub mod server;
pub mod subscriptions;

pub use client::{ClientId, ClientRegistry};
pub use server::Spoofer;
pub use subscriptions::SubscriptionTable;
