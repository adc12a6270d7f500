//! Connected-client bookkeeping and per-socket read/write plumbing.

use std::sync::Arc;

use axum::extract::ws::{Message as WsMessage, WebSocket};
use dashmap::DashMap;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::handler;
use crate::subscriptions::SubscriptionTable;

/// Unique identifier for one connection. Two sockets never share an id, so
/// comparing ids is comparing connection identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClientId(pub String);

impl Default for ClientId {
    fn default() -> Self {
        Self(format!("client_{}", Uuid::now_v7()))
    }
}

impl ClientId {
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registry of connected clients: id -> bounded send queue.
///
/// The subscription table is not consulted or cleaned here. A closed
/// client's queue just disappears from the map; stale table entries keep
/// pointing at it and sends fail fast.
pub struct ClientRegistry {
    clients: DashMap<ClientId, mpsc::Sender<String>>,
    max_send_queue: usize,
}

impl ClientRegistry {
    pub fn new(max_send_queue: usize) -> Self {
        Self {
            clients: DashMap::new(),
            max_send_queue,
        }
    }

    /// Register a new client and return its id plus the queue's receive end.
    pub fn register(&self) -> (ClientId, mpsc::Receiver<String>) {
        let id = ClientId::new();
        let (tx, rx) = mpsc::channel(self.max_send_queue);
        let _ = self.clients.insert(id.clone(), tx);
        (id, rx)
    }

    pub fn unregister(&self, id: &ClientId) {
        let _ = self.clients.remove(id);
    }

    /// Queue a frame for one client. Returns false (never blocks, never
    /// errors out) when the client is gone or its queue is full.
    pub fn send_to(&self, id: &ClientId, message: String) -> bool {
        let Some(tx) = self.clients.get(id) else {
            return false;
        };
        match tx.try_send(message) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(msg)) => {
                tracing::warn!(client_id = %id, msg_len = msg.len(), "send queue full, dropping frame");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    pub fn count(&self) -> usize {
        self.clients.len()
    }
}

/// Drive one WebSocket connection until the peer hangs up or the server
/// shuts down.
///
/// Writer task drains the client's queue onto the socket; reader task feeds
/// every text frame through the protocol handler and queues the reply. On
/// shutdown both tasks bail out and the socket is dropped without a close
/// handshake — clients are meant to observe an abnormal disconnect.
pub async fn handle_socket(
    socket: WebSocket,
    client_id: ClientId,
    mut rx: mpsc::Receiver<String>,
    registry: Arc<ClientRegistry>,
    table: Arc<SubscriptionTable>,
    shutdown: CancellationToken,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let writer_shutdown = shutdown.clone();
    let writer = tokio::spawn(async move {
        loop {
            tokio::select! {
                msg = rx.recv() => {
                    match msg {
                        Some(text) => {
                            if ws_tx.send(WsMessage::Text(text.into())).await.is_err() {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                _ = writer_shutdown.cancelled() => break,
            }
        }
    });

    let reader_cid = client_id.clone();
    let reader_registry = Arc::clone(&registry);
    let reader = tokio::spawn(async move {
        loop {
            tokio::select! {
                msg = ws_rx.next() => {
                    match msg {
                        Some(Ok(WsMessage::Text(text))) => {
                            let reply = handler::handle_frame(&text, &reader_cid, &table);
                            if let Ok(json) = serde_json::to_string(&reply) {
                                let _ = reader_registry.send_to(&reader_cid, json);
                            }
                        }
                        Some(Ok(WsMessage::Close(_))) | Some(Err(_)) | None => break,
                        // Binary/Ping/Pong frames are not part of the protocol
                        Some(Ok(_)) => {}
                    }
                }
                _ = shutdown.cancelled() => break,
            }
        }
    });

    tokio::select! {
        _ = writer => {},
        _ = reader => {},
    }

    registry.unregister(&client_id);
    tracing::debug!(client_id = %client_id, "client disconnected");
}
