//! Spoofer configuration and eager validation.
//!
//! Event-kind problems are construction errors: a spoofer with nothing to
//! spoof, or configured with a kind the synthesizer cannot produce, must
//! fail before any socket is bound.

use crate::events::{EventKind, SUPPORTED_EVENTS};

pub const DEFAULT_FREQUENCY_MS: u64 = 10_000;
pub const DEFAULT_PORT: u16 = 8080;

/// Which event kinds to emit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventSelection {
    /// Every supported kind.
    All,
    /// An explicit, non-empty list of supported kinds.
    Kinds(Vec<EventKind>),
}

/// Construction parameters for a spoofer instance.
#[derive(Clone, Debug)]
pub struct SpooferConfig {
    pub events: EventSelection,
    pub frequency_ms: u64,
    pub port: u16,
}

impl Default for SpooferConfig {
    fn default() -> Self {
        Self {
            events: EventSelection::All,
            frequency_ms: DEFAULT_FREQUENCY_MS,
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("you must define some events to spoof")]
    NoEvents,
    #[error("event kind `{0}` is unsupported; supported kinds are: {supported}", supported = supported_list())]
    UnsupportedEvent(EventKind),
    #[error("unknown event kind `{0}`")]
    UnknownEvent(String),
}

fn supported_list() -> String {
    SUPPORTED_EVENTS
        .iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl EventSelection {
    /// Resolve the selection into the concrete kind list, validating it.
    pub fn resolve(&self) -> Result<Vec<EventKind>, ConfigError> {
        match self {
            Self::All => Ok(SUPPORTED_EVENTS.to_vec()),
            Self::Kinds(kinds) => {
                if kinds.is_empty() {
                    return Err(ConfigError::NoEvents);
                }
                if let Some(bad) = kinds.iter().find(|k| !k.is_supported()) {
                    return Err(ConfigError::UnsupportedEvent(*bad));
                }
                Ok(kinds.clone())
            }
        }
    }
}
