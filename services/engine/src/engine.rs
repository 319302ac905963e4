//! Per-request orchestration
//!
//! Locking discipline: the registry mutexes are held only for map
//! lookups and insertions, never across matching, I/O, or broadcast.
//! Each book and stop manager carries its own mutex held for the full
//! operation, so distinct symbols match in parallel while one symbol
//! matches serially.

use matching_engine::{MatchExecutor, OrderBook, StopOrderManager};
use market_data::trades::DEFAULT_TRADE_HISTORY;
use market_data::{BroadcastQueue, ObserverSink, TradeTape};
use parking_lot::Mutex;
use persistence::Wal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};
use types::depth::BookLevel;
use types::errors::EngineError;
use types::fee::FeeSchedule;
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderStatus, OrderType, Side};
use types::stop::{StopOrder, StopType};
use types::time::now_ns;
use types::trade::Trade;

/// A validated submission before id assignment.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub symbol: String,
    pub order_type: OrderType,
    pub side: Side,
    pub quantity: Quantity,
    pub price: Price,
}

/// A validated stop submission before id assignment.
#[derive(Debug, Clone)]
pub struct NewStopOrder {
    pub symbol: String,
    pub stop_type: StopType,
    pub side: Side,
    pub quantity: Quantity,
    pub trigger_price: Price,
    pub limit_price: Price,
    pub trail_amount: Price,
    pub user_id: String,
}

/// Result of an order submission.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub order: Order,
    pub status: OrderStatus,
    pub trades: Vec<Trade>,
    pub filled_quantity: Quantity,
    pub remaining_quantity: Quantity,
}

/// Result of a successful cancellation.
#[derive(Debug, Clone)]
pub struct CancelOutcome {
    pub order_id: String,
    pub symbol: String,
}

/// Depth snapshot for the query surface.
#[derive(Debug, Clone)]
pub struct OrderBookSnapshot {
    pub symbol: String,
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
    pub best_bid: Option<Price>,
    pub best_ask: Option<Price>,
}

/// Top of book for one symbol in the stats view.
#[derive(Debug, Clone)]
pub struct SymbolQuote {
    pub symbol: String,
    pub best_bid: Option<Price>,
    pub best_ask: Option<Price>,
}

/// Engine-wide counters and per-symbol quotes.
#[derive(Debug, Clone)]
pub struct EngineStats {
    pub total_orders: u64,
    pub total_trades: u64,
    pub ws_clients: usize,
    pub symbols: Vec<SymbolQuote>,
}

/// Depth pushed to observers after every trade batch.
const BROADCAST_DEPTH: usize = 10;

pub struct Engine {
    books: Mutex<HashMap<String, Arc<Mutex<OrderBook>>>>,
    stop_managers: Mutex<HashMap<String, Arc<Mutex<StopOrderManager>>>>,
    order_id_to_symbol: Mutex<HashMap<String, String>>,
    tapes: Mutex<HashMap<String, TradeTape>>,
    wal: Wal,
    broadcast: BroadcastQueue,
    sink: Arc<dyn ObserverSink>,
    executor: MatchExecutor,
    total_orders: AtomicU64,
    total_trades: AtomicU64,
}

impl Engine {
    pub fn new(wal: Wal, sink: Arc<dyn ObserverSink>) -> Self {
        Self::with_counters(wal, sink, 0, 0, 0)
    }

    pub(crate) fn with_counters(
        wal: Wal,
        sink: Arc<dyn ObserverSink>,
        total_orders: u64,
        total_trades: u64,
        trade_sequence: u64,
    ) -> Self {
        let executor = MatchExecutor::with_sequence(
            FeeSchedule::default(),
            Arc::new(AtomicU64::new(trade_sequence)),
        );
        Self {
            books: Mutex::new(HashMap::new()),
            stop_managers: Mutex::new(HashMap::new()),
            order_id_to_symbol: Mutex::new(HashMap::new()),
            tapes: Mutex::new(HashMap::new()),
            wal,
            broadcast: BroadcastQueue::new(Arc::clone(&sink)),
            sink,
            executor,
            total_orders: AtomicU64::new(total_orders),
            total_trades: AtomicU64::new(total_trades),
        }
    }

    // ── Submission ──────────────────────────────────────────────────

    /// Submit an order: log it, match it, log and publish the fills,
    /// then drain any stops its trades triggered.
    pub fn submit_order(&self, new_order: NewOrder) -> Result<SubmitOutcome, EngineError> {
        Self::validate_order(&new_order)?;

        let sequence = self.total_orders.fetch_add(1, Ordering::Relaxed) + 1;
        let price = if new_order.order_type.requires_price() {
            new_order.price
        } else {
            Price::ZERO
        };
        let order = Order {
            order_id: format!("ORD-{sequence}"),
            symbol: new_order.symbol,
            order_type: new_order.order_type,
            side: new_order.side,
            quantity: new_order.quantity,
            price,
            timestamp: now_ns(),
        };

        self.wal.append_order(&order);
        let trades = self.execute(&order);

        let filled_quantity = trades
            .iter()
            .fold(Quantity::ZERO, |acc, t| acc + t.quantity);
        let remaining_quantity = order.quantity.saturating_sub(filled_quantity);
        let status = order.order_type.settle_status(filled_quantity, remaining_quantity);

        if let Some(last_price) = trades.last().map(|t| t.price) {
            self.run_stop_cycle(&order.symbol, last_price);
        }

        debug!(
            order_id = %order.order_id,
            symbol = %order.symbol,
            ?status,
            fills = trades.len(),
            "order processed"
        );

        Ok(SubmitOutcome {
            order,
            status,
            trades,
            filled_quantity,
            remaining_quantity,
        })
    }

    /// Store a stop order until its trigger price is crossed.
    pub fn submit_stop_order(&self, new_stop: NewStopOrder) -> Result<StopOrder, EngineError> {
        Self::validate_stop_order(&new_stop)?;

        let sequence = self.total_orders.fetch_add(1, Ordering::Relaxed) + 1;
        let stop = StopOrder {
            order_id: format!("STO-{sequence}"),
            symbol: new_stop.symbol,
            stop_type: new_stop.stop_type,
            side: new_stop.side,
            quantity: new_stop.quantity,
            trigger_price: new_stop.trigger_price,
            limit_price: new_stop.limit_price,
            trail_amount: new_stop.trail_amount,
            created_at: now_ns(),
            user_id: new_stop.user_id,
            best_price: new_stop.trigger_price,
        };

        self.wal.append_stop_order(&stop);
        let manager = self.stop_manager(&stop.symbol);
        self.order_id_to_symbol
            .lock()
            .insert(stop.order_id.clone(), stop.symbol.clone());
        manager.lock().add_stop_order(stop.clone());

        debug!(order_id = %stop.order_id, symbol = %stop.symbol, "stop order accepted");
        Ok(stop)
    }

    /// Cancel by id wherever it lives: the id may rest in the book or
    /// sit dormant in the stop manager; both are attempted.
    pub fn cancel_order(&self, order_id: &str) -> Result<CancelOutcome, EngineError> {
        let symbol = self
            .order_id_to_symbol
            .lock()
            .get(order_id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownOrder(order_id.to_string()))?;

        let book = self.book_if_exists(&symbol);
        let cancelled_book = book
            .as_ref()
            .map(|b| b.lock().cancel_order(order_id))
            .unwrap_or(false);
        let cancelled_stop = self
            .stop_manager_if_exists(&symbol)
            .map(|m| m.lock().cancel_stop_order(order_id))
            .unwrap_or(false);

        if !(cancelled_book || cancelled_stop) {
            return Err(EngineError::UnknownOrder(order_id.to_string()));
        }

        self.wal.append_cancel(order_id, "user_request");
        self.order_id_to_symbol.lock().remove(order_id);
        if let Some(book) = book {
            let (bids, asks) = {
                let book = book.lock();
                (book.top_bids(BROADCAST_DEPTH), book.top_asks(BROADCAST_DEPTH))
            };
            self.broadcast.push_book_update(&symbol, bids, asks);
        }

        info!(order_id, symbol = %symbol, "order cancelled");
        Ok(CancelOutcome {
            order_id: order_id.to_string(),
            symbol,
        })
    }

    // ── Matching pipeline ───────────────────────────────────────────

    /// Match one order and publish its effects. Shared by direct
    /// submissions and materialized stops.
    fn execute(&self, order: &Order) -> Vec<Trade> {
        let book = self.book(&order.symbol);
        self.order_id_to_symbol
            .lock()
            .insert(order.order_id.clone(), order.symbol.clone());

        let trades = book.lock().add_order(order);
        self.total_trades
            .fetch_add(trades.len() as u64, Ordering::Relaxed);

        for trade in &trades {
            self.wal.append_trade(trade);
            self.broadcast.push_trade(trade.clone());
            self.record_on_tape(trade);
        }

        if !trades.is_empty() {
            let (bids, asks) = {
                let book = book.lock();
                (book.top_bids(BROADCAST_DEPTH), book.top_asks(BROADCAST_DEPTH))
            };
            self.broadcast.push_book_update(&order.symbol, bids, asks);
        }

        // Fully consumed or never resting: drop the lookup entry again
        let rested = book.lock().resting_quantity(&order.order_id).is_some();
        if !rested {
            self.order_id_to_symbol.lock().remove(&order.order_id);
        }

        trades
    }

    /// Drain stops satisfied by the latest trade price, feeding each
    /// materialized order back through the matching pipeline. Every pass
    /// removes the stops it fires, so the loop terminates.
    fn run_stop_cycle(&self, symbol: &str, last_trade_price: Price) {
        let Some(manager) = self.stop_manager_if_exists(symbol) else {
            return;
        };

        let mut last_price = Some(last_trade_price);
        while let Some(price) = last_price.take() {
            let triggered = {
                let mut manager = manager.lock();
                manager.update_trailing_stops(price);
                manager.check_triggers(price, now_ns())
            };

            for order in triggered {
                info!(
                    order_id = %order.order_id,
                    symbol,
                    order_type = %order.order_type,
                    "stop order triggered"
                );
                // The dormant stop is consumed; the materialized order is
                // a fresh loggable event so replay sees the same book.
                self.wal.append_cancel(&order.order_id, "stop_triggered");
                self.wal.append_order(&order);
                let trades = self.execute(&order);
                if let Some(trade) = trades.last() {
                    last_price = Some(trade.price);
                }
            }
        }
    }

    // ── Validation ──────────────────────────────────────────────────

    fn validate_order(new_order: &NewOrder) -> Result<(), EngineError> {
        if new_order.symbol.is_empty() {
            return Err(EngineError::InvalidRequest("symbol must not be empty".into()));
        }
        if new_order.quantity <= Quantity::ZERO {
            return Err(EngineError::InvalidRequest("quantity must be positive".into()));
        }
        if new_order.order_type.requires_price() && new_order.price <= Price::ZERO {
            return Err(EngineError::InvalidRequest(format!(
                "{} order requires positive price",
                new_order.order_type
            )));
        }
        Ok(())
    }

    fn validate_stop_order(new_stop: &NewStopOrder) -> Result<(), EngineError> {
        if new_stop.symbol.is_empty() {
            return Err(EngineError::InvalidRequest("symbol must not be empty".into()));
        }
        if new_stop.quantity <= Quantity::ZERO {
            return Err(EngineError::InvalidRequest("quantity must be positive".into()));
        }
        if new_stop.trigger_price <= Price::ZERO {
            return Err(EngineError::InvalidRequest(
                "trigger_price must be positive".into(),
            ));
        }
        if new_stop.stop_type == StopType::StopLimit && new_stop.limit_price <= Price::ZERO {
            return Err(EngineError::InvalidRequest(
                "stop_limit requires limit_price".into(),
            ));
        }
        if new_stop.stop_type == StopType::TrailingStop && new_stop.trail_amount <= Price::ZERO {
            return Err(EngineError::InvalidRequest(
                "trailing_stop requires trail_amount".into(),
            ));
        }
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────────

    /// Top-N snapshot of one book.
    pub fn orderbook(&self, symbol: &str, depth: usize) -> Option<OrderBookSnapshot> {
        let book = self.book_if_exists(symbol)?;
        let book = book.lock();
        Some(OrderBookSnapshot {
            symbol: symbol.to_string(),
            bids: book.top_bids(depth),
            asks: book.top_asks(depth),
            best_bid: book.best_bid(),
            best_ask: book.best_ask(),
        })
    }

    /// Recent trades for a symbol, newest first.
    pub fn recent_trades(&self, symbol: &str, limit: usize) -> Vec<Trade> {
        self.tapes
            .lock()
            .get(symbol)
            .map(|tape| tape.recent(limit))
            .unwrap_or_default()
    }

    /// Every symbol with a book.
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.books.lock().keys().cloned().collect();
        symbols.sort();
        symbols
    }

    pub fn stats(&self) -> EngineStats {
        let symbols = {
            let books = self.books.lock();
            let mut quotes: Vec<SymbolQuote> = books
                .iter()
                .map(|(symbol, book)| {
                    let book = book.lock();
                    SymbolQuote {
                        symbol: symbol.clone(),
                        best_bid: book.best_bid(),
                        best_ask: book.best_ask(),
                    }
                })
                .collect();
            quotes.sort_by(|a, b| a.symbol.cmp(&b.symbol));
            quotes
        };
        EngineStats {
            total_orders: self.total_orders.load(Ordering::Relaxed),
            total_trades: self.total_trades.load(Ordering::Relaxed),
            ws_clients: self.sink.client_count(),
            symbols,
        }
    }

    pub fn ws_clients(&self) -> usize {
        self.sink.client_count()
    }

    pub fn total_orders(&self) -> u64 {
        self.total_orders.load(Ordering::Relaxed)
    }

    pub fn total_trades(&self) -> u64 {
        self.total_trades.load(Ordering::Relaxed)
    }

    /// Drain the fan-out queue and the WAL, in that order. Idempotent.
    pub fn shutdown(&self) {
        info!("engine shutting down");
        self.broadcast.stop();
        self.wal.stop();
    }

    // ── Registry access ─────────────────────────────────────────────

    fn book(&self, symbol: &str) -> Arc<Mutex<OrderBook>> {
        let mut books = self.books.lock();
        Arc::clone(books.entry(symbol.to_string()).or_insert_with(|| {
            Arc::new(Mutex::new(OrderBook::new(symbol, self.executor.clone())))
        }))
    }

    fn book_if_exists(&self, symbol: &str) -> Option<Arc<Mutex<OrderBook>>> {
        self.books.lock().get(symbol).cloned()
    }

    fn stop_manager(&self, symbol: &str) -> Arc<Mutex<StopOrderManager>> {
        let mut managers = self.stop_managers.lock();
        Arc::clone(
            managers
                .entry(symbol.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(StopOrderManager::new(symbol)))),
        )
    }

    fn stop_manager_if_exists(&self, symbol: &str) -> Option<Arc<Mutex<StopOrderManager>>> {
        self.stop_managers.lock().get(symbol).cloned()
    }

    fn record_on_tape(&self, trade: &Trade) {
        let mut tapes = self.tapes.lock();
        tapes
            .entry(trade.symbol.clone())
            .or_insert_with(|| TradeTape::new(trade.symbol.clone(), DEFAULT_TRADE_HISTORY))
            .record(trade.clone());
    }

    // ── Recovery hooks ──────────────────────────────────────────────

    pub(crate) fn restore_resting_order(&self, order: &Order) {
        self.book(&order.symbol).lock().insert_resting(order);
        self.order_id_to_symbol
            .lock()
            .insert(order.order_id.clone(), order.symbol.clone());
    }

    pub(crate) fn restore_stop_order(&self, stop: StopOrder) {
        self.order_id_to_symbol
            .lock()
            .insert(stop.order_id.clone(), stop.symbol.clone());
        self.stop_manager(&stop.symbol)
            .lock()
            .insert_from_replay(stop);
    }

    pub(crate) fn restore_trade(&self, trade: Trade) {
        let mut tapes = self.tapes.lock();
        tapes
            .entry(trade.symbol.clone())
            .or_insert_with(|| TradeTape::new(trade.symbol.clone(), DEFAULT_TRADE_HISTORY))
            .record(trade);
    }
}
