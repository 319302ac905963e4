//! WebSocket observer transport
//!
//! The hub implements the pipeline's `ObserverSink`: broadcast workers
//! hand it trades and depth snapshots, it serializes them once and fans
//! them out over a tokio broadcast channel. Each connected client task
//! forwards frames (optionally filtered by symbol) with a 30s heartbeat.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use market_data::{ObserverMessage, ObserverSink};
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info};
use types::depth::BookLevel;
use types::trade::Trade;

use crate::state::AppState;

const CHANNEL_CAPACITY: usize = 1024;
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// A serialized observer message tagged with its symbol for filtering.
#[derive(Debug, Clone)]
pub struct WsFrame {
    pub symbol: String,
    pub payload: String,
}

/// Fan-out hub shared by every WebSocket client task.
pub struct WsHub {
    tx: broadcast::Sender<WsFrame>,
    clients: AtomicUsize,
}

impl WsHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            clients: AtomicUsize::new(0),
        }
    }

    fn publish(&self, symbol: &str, message: &ObserverMessage) {
        let payload = match serde_json::to_string(message) {
            Ok(payload) => payload,
            Err(e) => {
                error!(error = %e, "failed to serialize observer message");
                return;
            }
        };
        // Send fails only when no client is subscribed; that is fine
        let _ = self.tx.send(WsFrame {
            symbol: symbol.to_string(),
            payload,
        });
    }
}

impl Default for WsHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ObserverSink for WsHub {
    fn broadcast_trade(&self, trade: &Trade) {
        self.publish(&trade.symbol, &ObserverMessage::trade(trade));
    }

    fn broadcast_orderbook_update(&self, symbol: &str, bids: &[BookLevel], asks: &[BookLevel]) {
        self.publish(symbol, &ObserverMessage::orderbook(symbol, bids, asks));
    }

    fn client_count(&self) -> usize {
        self.clients.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Optional symbol filter; absent means the full firehose.
    pub symbol: Option<String>,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, query.symbol, state))
}

async fn handle_socket(socket: WebSocket, symbol_filter: Option<String>, state: AppState) {
    let hub = &state.hub;
    hub.clients.fetch_add(1, Ordering::Relaxed);
    info!(filter = ?symbol_filter, "observer connected");

    let (mut sender, mut receiver) = socket.split();
    let mut rx = hub.tx.subscribe();
    let mut ping_interval = tokio::time::interval(PING_INTERVAL);

    loop {
        tokio::select! {
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // Subscribers only listen
                    Some(Err(e)) => {
                        debug!(error = %e, "websocket error");
                        break;
                    }
                }
            }

            frame = rx.recv() => {
                match frame {
                    Ok(frame) => {
                        let wanted = symbol_filter
                            .as_deref()
                            .map_or(true, |s| s == frame.symbol);
                        if wanted && sender.send(Message::Text(frame.payload)).await.is_err() {
                            break;
                        }
                    }
                    // Slow consumer skipped some frames; keep going
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "observer lagged; frames dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            _ = ping_interval.tick() => {
                if sender.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    hub.clients.fetch_sub(1, Ordering::Relaxed);
    info!("observer disconnected");
}
