//! Per-symbol order book
//!
//! Greedy price-time priority matching with an id index for O(log n + k)
//! cancellation. The book is single-threaded by construction; the owner
//! wraps it in a per-symbol mutex.

pub mod ask_book;
pub mod bid_book;
pub mod price_level;

pub use ask_book::AskBook;
pub use bid_book::BidBook;
pub use price_level::PriceLevel;

use std::collections::HashMap;
use types::depth::BookLevel;
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderType, Side};
use types::trade::Trade;

use crate::matching::{crossing, MatchExecutor};

/// Order book for a single symbol.
pub struct OrderBook {
    symbol: String,
    bids: BidBook,
    asks: AskBook,
    /// order_id → (price, side) of the resting order, for cancellation.
    order_index: HashMap<String, (Price, Side)>,
    executor: MatchExecutor,
}

impl OrderBook {
    pub fn new(symbol: impl Into<String>, executor: MatchExecutor) -> Self {
        Self {
            symbol: symbol.into(),
            bids: BidBook::new(),
            asks: AskBook::new(),
            order_index: HashMap::new(),
            executor,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Accept an incoming order, match it against the opposite side, rest
    /// the remainder iff the order type permits, and return the fills in
    /// match order.
    ///
    /// Matching always terminates: every iteration strictly shrinks
    /// either the taker's remainder or the opposite side.
    pub fn add_order(&mut self, order: &Order) -> Vec<Trade> {
        // FOK pre-check: mutation-free walk of the opposite side under the
        // price gate. Unfillable → no trades, book untouched.
        if order.order_type == OrderType::Fok {
            let gate = (!order.price.is_zero()).then_some(order.price);
            let fillable = match order.side {
                Side::Buy => self.asks.fillable(gate, order.quantity),
                Side::Sell => self.bids.fillable(gate, order.quantity),
            };
            if fillable < order.quantity {
                return Vec::new();
            }
        }

        let mut remaining = order.quantity;
        let trades = match order.side {
            Side::Buy => Self::match_against_asks(
                &mut self.asks,
                &mut self.order_index,
                &self.executor,
                &self.symbol,
                order,
                &mut remaining,
            ),
            Side::Sell => Self::match_against_bids(
                &mut self.bids,
                &mut self.order_index,
                &self.executor,
                &self.symbol,
                order,
                &mut remaining,
            ),
        };

        if !remaining.is_zero() && order.order_type.may_rest() {
            match order.side {
                Side::Buy => self
                    .bids
                    .insert(order.price, order.order_id.clone(), remaining),
                Side::Sell => self
                    .asks
                    .insert(order.price, order.order_id.clone(), remaining),
            }
            self.order_index
                .insert(order.order_id.clone(), (order.price, order.side));
        }

        trades
    }

    fn match_against_asks(
        asks: &mut AskBook,
        order_index: &mut HashMap<String, (Price, Side)>,
        executor: &MatchExecutor,
        symbol: &str,
        taker: &Order,
        remaining: &mut Quantity,
    ) -> Vec<Trade> {
        let mut trades = Vec::new();

        while !remaining.is_zero() {
            let Some((level_price, level)) = asks.best_level_mut() else {
                break;
            };
            if !crossing::crosses(taker.order_type, taker.side, taker.price, level_price) {
                break;
            }

            while let Some((maker_id, maker_qty)) = level.peek_front() {
                let maker_id = maker_id.to_owned();
                let trade_qty = (*remaining).min(maker_qty);

                trades.push(executor.execute_trade(
                    symbol,
                    &maker_id,
                    &taker.order_id,
                    taker.side,
                    level_price,
                    trade_qty,
                ));

                *remaining -= trade_qty;
                if level.fill_front(trade_qty) {
                    order_index.remove(&maker_id);
                }
                if remaining.is_zero() {
                    break;
                }
            }

            let emptied = level.is_empty();
            if emptied {
                asks.remove_level(level_price);
            }
        }

        trades
    }

    fn match_against_bids(
        bids: &mut BidBook,
        order_index: &mut HashMap<String, (Price, Side)>,
        executor: &MatchExecutor,
        symbol: &str,
        taker: &Order,
        remaining: &mut Quantity,
    ) -> Vec<Trade> {
        let mut trades = Vec::new();

        while !remaining.is_zero() {
            let Some((level_price, level)) = bids.best_level_mut() else {
                break;
            };
            if !crossing::crosses(taker.order_type, taker.side, taker.price, level_price) {
                break;
            }

            while let Some((maker_id, maker_qty)) = level.peek_front() {
                let maker_id = maker_id.to_owned();
                let trade_qty = (*remaining).min(maker_qty);

                trades.push(executor.execute_trade(
                    symbol,
                    &maker_id,
                    &taker.order_id,
                    taker.side,
                    level_price,
                    trade_qty,
                ));

                *remaining -= trade_qty;
                if level.fill_front(trade_qty) {
                    order_index.remove(&maker_id);
                }
                if remaining.is_zero() {
                    break;
                }
            }

            let emptied = level.is_empty();
            if emptied {
                bids.remove_level(level_price);
            }
        }

        trades
    }

    /// Replay-only entry point: rest an order without matching. The
    /// caller guarantees the order is in a resting-compatible state.
    pub fn insert_resting(&mut self, order: &Order) {
        match order.side {
            Side::Buy => self
                .bids
                .insert(order.price, order.order_id.clone(), order.quantity),
            Side::Sell => self
                .asks
                .insert(order.price, order.order_id.clone(), order.quantity),
        }
        self.order_index
            .insert(order.order_id.clone(), (order.price, order.side));
    }

    /// Cancel a resting order by id.
    ///
    /// Unknown ids return false; that is not an error.
    pub fn cancel_order(&mut self, order_id: &str) -> bool {
        let Some((price, side)) = self.order_index.get(order_id).copied() else {
            return false;
        };
        let removed = match side {
            Side::Buy => self.bids.remove(order_id, price),
            Side::Sell => self.asks.remove(order_id, price),
        };
        if removed {
            self.order_index.remove(order_id);
        }
        removed
    }

    /// Top `n` bid levels, best first.
    pub fn top_bids(&self, n: usize) -> Vec<BookLevel> {
        self.bids.depth_snapshot(n)
    }

    /// Top `n` ask levels, best first.
    pub fn top_asks(&self, n: usize) -> Vec<BookLevel> {
        self.asks.depth_snapshot(n)
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best_price()
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best_price()
    }

    /// Remaining quantity of a resting order, if it rests here.
    pub fn resting_quantity(&self, order_id: &str) -> Option<Quantity> {
        let (price, side) = self.order_index.get(order_id).copied()?;
        match side {
            Side::Buy => self.bids.level(price)?.quantity_of(order_id),
            Side::Sell => self.asks.level(price)?.quantity_of(order_id),
        }
    }
}
