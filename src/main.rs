use clap::Parser;
use spoofer_core::config::{EventSelection, SpooferConfig, DEFAULT_FREQUENCY_MS, DEFAULT_PORT};
use spoofer_core::events::EventKind;
use spoofer_server::Spoofer;

/// Mock Twitch PubSub server for local development and integration tests.
#[derive(Debug, Parser)]
#[command(name = "twitch-spoofer")]
struct Args {
    /// Event kinds to spoof: "all" or a comma-separated list
    /// (bits, bits-anonymous, bits-entitled, subscription)
    #[arg(long, default_value = "all")]
    events: String,

    /// Emission interval in milliseconds
    #[arg(long, default_value_t = DEFAULT_FREQUENCY_MS)]
    frequency_ms: u64,

    /// TCP port to listen on
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,
}

fn parse_events(raw: &str) -> Result<EventSelection, spoofer_core::ConfigError> {
    if raw.trim() == "all" {
        return Ok(EventSelection::All);
    }
    let kinds = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse::<EventKind>)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(EventSelection::Kinds(kinds))
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let events = parse_events(&args.events).unwrap_or_else(|e| {
        eprintln!("twitch-spoofer: {e}");
        std::process::exit(2);
    });

    let config = SpooferConfig {
        events,
        frequency_ms: args.frequency_ms,
        port: args.port,
    };

    // Event-kind validation happens here, before any socket is bound
    let mut spoofer = Spoofer::new(config).unwrap_or_else(|e| {
        eprintln!("twitch-spoofer: {e}");
        std::process::exit(2);
    });

    spoofer.start().await.expect("failed to start spoofer");
    tracing::info!(port = spoofer.port(), "spoofer ready, ctrl-c to stop");

    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for ctrl+c");

    spoofer.stop();
    tracing::info!("shut down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_all_sentinel() {
        assert_eq!(parse_events("all").unwrap(), EventSelection::All);
        assert_eq!(parse_events(" all ").unwrap(), EventSelection::All);
    }

    #[test]
    fn parse_comma_separated_kinds() {
        let selection = parse_events("bits, bits-anonymous").unwrap();
        assert_eq!(
            selection,
            EventSelection::Kinds(vec![EventKind::Bits, EventKind::BitsAnonymous])
        );
    }

    #[test]
    fn parse_rejects_unknown_tokens() {
        assert!(parse_events("bits,cheers").is_err());
    }
}
