//! Conditional (stop) order types
//!
//! A stop order lies dormant until the last traded price crosses its
//! trigger, then materializes as a concrete market or limit order.

use crate::numeric::{Price, Quantity};
use crate::order::{Order, OrderType, Side};
use serde::{Deserialize, Serialize};

/// Stop order variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopType {
    /// Market order on trigger
    StopLoss,
    /// Limit order at `limit_price` on trigger
    StopLimit,
    /// Market order on trigger, opposite direction of a stop-loss
    TakeProfit,
    /// Trigger trails the best price seen by `trail_amount`
    TrailingStop,
}

/// A dormant conditional order.
///
/// `limit_price` is zero unless `stop_type` is stop-limit; `trail_amount`
/// is zero unless trailing. `best_price` tracks the extreme seen so far
/// for the trailing variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopOrder {
    pub order_id: String,
    pub symbol: String,
    pub stop_type: StopType,
    pub side: Side,
    pub quantity: Quantity,
    pub trigger_price: Price,
    pub limit_price: Price,
    pub trail_amount: Price,
    pub created_at: i64,
    #[serde(default)]
    pub user_id: String,
    pub best_price: Price,
}

impl StopOrder {
    /// Whether `last_trade_price` satisfies the trigger condition.
    pub fn is_triggered_by(&self, last_trade_price: Price) -> bool {
        match self.side {
            Side::Buy => last_trade_price >= self.trigger_price,
            Side::Sell => last_trade_price <= self.trigger_price,
        }
    }

    /// Materialize into a concrete order: a limit order at `limit_price`
    /// for the stop-limit variant, a market order otherwise. The stop's
    /// id carries over.
    pub fn materialize(&self, timestamp: i64) -> Order {
        let (order_type, price) = match self.stop_type {
            StopType::StopLimit => (OrderType::Limit, self.limit_price),
            _ => (OrderType::Market, Price::ZERO),
        };
        Order {
            order_id: self.order_id.clone(),
            symbol: self.symbol.clone(),
            order_type,
            side: self.side,
            quantity: self.quantity,
            price,
            timestamp,
        }
    }
}
