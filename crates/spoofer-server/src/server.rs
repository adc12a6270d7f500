//! Server lifecycle: owns the listening socket, the emitter task, and the
//! shutdown token for every open connection.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::any;
use axum::Router;
use spoofer_core::config::{ConfigError, SpooferConfig};
use spoofer_core::events::EventKind;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use crate::client::{self, ClientRegistry};
use crate::emitter;
use crate::subscriptions::SubscriptionTable;

const MAX_SEND_QUEUE: usize = 256;

/// Shared state for the WebSocket route.
#[derive(Clone)]
struct AppState {
    registry: Arc<ClientRegistry>,
    table: Arc<SubscriptionTable>,
    shutdown: CancellationToken,
}

/// The spoofer instance. Construct with [`Spoofer::new`], then drive with
/// `start`/`stop`; both are idempotent.
#[derive(Debug)]
pub struct Spoofer {
    kinds: Vec<EventKind>,
    frequency: Duration,
    port: u16,
    bound_port: u16,
    server: Option<tokio::task::JoinHandle<()>>,
    emitter: Option<tokio::task::JoinHandle<()>>,
    shutdown: Option<CancellationToken>,
}

impl Spoofer {
    /// Validate the configuration eagerly. Event-kind problems are fatal
    /// here, before any socket is bound.
    pub fn new(config: SpooferConfig) -> Result<Self, ConfigError> {
        let kinds = config.events.resolve()?;
        Ok(Self {
            kinds,
            // A zero interval would panic in tokio; clamp to 1ms
            frequency: Duration::from_millis(config.frequency_ms.max(1)),
            port: config.port,
            bound_port: 0,
            server: None,
            emitter: None,
            shutdown: None,
        })
    }

    /// Bind the listener and start emitting. No-op when already running.
    pub async fn start(&mut self) -> io::Result<()> {
        if self.is_running() {
            return Ok(());
        }

        // Fresh state per run: a stopped spoofer keeps no subscriptions
        let registry = Arc::new(ClientRegistry::new(MAX_SEND_QUEUE));
        let table = Arc::new(SubscriptionTable::new());
        let shutdown = CancellationToken::new();

        let listener = tokio::net::TcpListener::bind(("0.0.0.0", self.port)).await?;
        self.bound_port = listener.local_addr()?.port();

        let router = build_router(AppState {
            registry: Arc::clone(&registry),
            table: Arc::clone(&table),
            shutdown: shutdown.clone(),
        });

        self.server = Some(tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        }));
        self.emitter = Some(emitter::start(
            self.kinds.clone(),
            self.frequency,
            table,
            registry,
        ));
        self.shutdown = Some(shutdown);

        let frequency_ms = self.frequency.as_millis();
        tracing::info!(port = self.bound_port, frequency_ms, "spoofer started");
        Ok(())
    }

    /// Tear down without ceremony. The emitter is stopped first, so no tick
    /// fires after this returns; connections are dropped with no close
    /// handshake, so clients see an abnormal disconnect — that asymmetry is
    /// the point, it exercises reconnect logic. No-op when not running.
    pub fn stop(&mut self) {
        if !self.is_running() {
            return;
        }
        if let Some(emitter) = self.emitter.take() {
            emitter.abort();
        }
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.cancel();
        }
        if let Some(server) = self.server.take() {
            server.abort();
        }
        tracing::info!(port = self.bound_port, "spoofer stopped");
    }

    /// True iff both the listening socket task and the emitter are alive.
    pub fn is_running(&self) -> bool {
        self.server.is_some() && self.emitter.is_some()
    }

    /// The port actually bound (resolves port 0 to the assigned one).
    pub fn port(&self) -> u16 {
        if self.is_running() {
            self.bound_port
        } else {
            self.port
        }
    }
}

impl Drop for Spoofer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn build_router(state: AppState) -> Router {
    // The real edge serves its WebSocket at the root path
    Router::new()
        .route("/", any(ws_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| async move {
        let (client_id, rx) = state.registry.register();
        tracing::debug!(client_id = %client_id, "client connected");
        client::handle_socket(
            socket,
            client_id,
            rx,
            state.registry,
            state.table,
            state.shutdown,
        )
        .await;
    })
}
