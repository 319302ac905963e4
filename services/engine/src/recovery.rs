//! Recovery from the event log
//!
//! Replays the ordered event sequence through a reduced engine: live
//! order and stop maps updated by trade and cancel events, then
//! reinserted into fresh books through the replay-only resting entry
//! point. The rebuilt state equals the state immediately before the
//! last durably flushed event.

use crate::engine::Engine;
use market_data::ObserverSink;
use persistence::{Replay, Wal, WalEvent, WalRecord};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use types::order::Order;
use types::stop::StopOrder;

/// State reduced from a full replay pass.
#[derive(Debug, Default)]
pub struct RecoveredState {
    /// Orders still live after all fills and cancels, in arrival order.
    /// Only resting-capable (limit) orders survive the filter.
    pub live_orders: Vec<Order>,
    /// Stop orders still dormant.
    pub live_stop_orders: Vec<StopOrder>,
    /// Every trade in log order, for tape reseeding.
    pub trades: Vec<types::trade::Trade>,
    /// Restored order-id counter (max numeric suffix seen).
    pub total_orders: u64,
    /// Count of replayed trade events.
    pub total_trades: u64,
    /// Restored trade-id sequence (max numeric suffix seen).
    pub trade_sequence: u64,
}

/// Numeric suffix of an `ORD-n` / `STO-n` / `T-n` id.
fn id_suffix(id: &str) -> Option<u64> {
    id.rsplit('-').next()?.parse().ok()
}

/// Reduce an ordered event sequence to live state.
pub fn rebuild(records: &[WalRecord]) -> RecoveredState {
    // Insertion sequence keys preserve arrival order for FIFO reinsertion
    let mut live_orders: HashMap<String, (usize, Order)> = HashMap::new();
    let mut live_stops: HashMap<String, (usize, StopOrder)> = HashMap::new();
    let mut state = RecoveredState::default();
    let mut arrival = 0usize;

    for record in records {
        match &record.event {
            WalEvent::Order(order) => {
                if let Some(n) = id_suffix(&order.order_id) {
                    state.total_orders = state.total_orders.max(n);
                }
                live_orders.insert(order.order_id.clone(), (arrival, order.clone()));
                arrival += 1;
            }
            WalEvent::StopOrder(stop) => {
                if let Some(n) = id_suffix(&stop.order_id) {
                    state.total_orders = state.total_orders.max(n);
                }
                live_stops.insert(stop.order_id.clone(), (arrival, stop.clone()));
                arrival += 1;
            }
            WalEvent::Trade(trade) => {
                state.total_trades += 1;
                if let Some(n) = id_suffix(&trade.trade_id) {
                    state.trade_sequence = state.trade_sequence.max(n);
                }
                for order_id in [&trade.maker_order_id, &trade.taker_order_id] {
                    if let Some((_, order)) = live_orders.get_mut(order_id.as_str()) {
                        order.quantity = order.quantity.saturating_sub(trade.quantity);
                        if order.quantity.is_zero() {
                            live_orders.remove(order_id.as_str());
                        }
                    }
                }
                state.trades.push(trade.clone());
            }
            WalEvent::Cancel(cancel) => {
                live_orders.remove(&cancel.order_id);
                live_stops.remove(&cancel.order_id);
            }
        }
    }

    // Only limit orders can rest; anything else with a live remainder
    // never made it onto a book and must not be resurrected.
    let mut survivors: Vec<(usize, Order)> = live_orders
        .into_values()
        .filter(|(_, order)| order.order_type.may_rest())
        .collect();
    survivors.sort_by_key(|(arrival, _)| *arrival);
    state.live_orders = survivors.into_iter().map(|(_, order)| order).collect();

    let mut stops: Vec<(usize, StopOrder)> = live_stops.into_values().collect();
    stops.sort_by_key(|(arrival, _)| *arrival);
    state.live_stop_orders = stops.into_iter().map(|(_, stop)| stop).collect();

    state
}

/// Build a ready engine from a replayed log: rebuild live state, seed
/// counters, rest survivors, and reseed the trade tapes. Runs before
/// the request boundary opens.
pub fn recover(wal: Wal, sink: Arc<dyn ObserverSink>, replay: Replay) -> Engine {
    let started = Instant::now();
    let state = rebuild(&replay.records);

    let engine = Engine::with_counters(
        wal,
        sink,
        state.total_orders,
        state.total_trades,
        state.trade_sequence,
    );

    for order in &state.live_orders {
        engine.restore_resting_order(order);
    }
    for stop in state.live_stop_orders.iter().cloned() {
        engine.restore_stop_order(stop);
    }
    let trade_count = state.trades.len();
    for trade in state.trades {
        engine.restore_trade(trade);
    }

    info!(
        events = replay.records.len(),
        skipped = replay.skipped,
        resting_orders = state.live_orders.len(),
        stop_orders = state.live_stop_orders.len(),
        trades = trade_count,
        total_orders = state.total_orders,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "recovery complete"
    );

    engine
}
