//! Order lifecycle types

use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    pub fn is_buy(&self) -> bool {
        matches!(self, Side::Buy)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// Execution policy of an incoming order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Match what crosses, rest the remainder
    Limit,
    /// No price gate, never rests
    Market,
    /// Immediate-or-cancel: match what crosses now, discard the rest
    Ioc,
    /// Fill-or-kill: fill completely or produce zero trades
    Fok,
}

impl OrderType {
    /// Whether this order type carries a price
    pub fn requires_price(&self) -> bool {
        !matches!(self, OrderType::Market)
    }

    /// Whether an unfilled remainder may rest on the book
    pub fn may_rest(&self) -> bool {
        matches!(self, OrderType::Limit)
    }

    /// Terminal status of a submission given its fill accounting.
    pub fn settle_status(&self, filled: Quantity, remaining: Quantity) -> OrderStatus {
        match self {
            OrderType::Limit => {
                if remaining.is_zero() {
                    OrderStatus::Filled
                } else if !filled.is_zero() {
                    OrderStatus::PartiallyFilled
                } else {
                    OrderStatus::Open
                }
            }
            OrderType::Market => {
                if filled.is_zero() {
                    OrderStatus::Cancelled
                } else if remaining.is_zero() {
                    OrderStatus::Filled
                } else {
                    OrderStatus::PartiallyFilled
                }
            }
            OrderType::Ioc => {
                if remaining.is_zero() {
                    OrderStatus::Filled
                } else if !filled.is_zero() {
                    OrderStatus::PartiallyFilled
                } else {
                    OrderStatus::Cancelled
                }
            }
            OrderType::Fok => {
                if remaining.is_zero() {
                    OrderStatus::Filled
                } else {
                    OrderStatus::Cancelled
                }
            }
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderType::Limit => "limit",
            OrderType::Market => "market",
            OrderType::Ioc => "ioc",
            OrderType::Fok => "fok",
        };
        write!(f, "{s}")
    }
}

/// Outcome of a submission, reported back to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Open,
    PartiallyFilled,
    Filled,
    Cancelled,
}

/// An order as accepted at ingress.
///
/// `price` is zero iff `order_type` is market. `timestamp` is Unix
/// nanoseconds assigned at ingress; within a price level only arrival
/// order matters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub symbol: String,
    pub order_type: OrderType,
    pub side: Side,
    pub quantity: Quantity,
    pub price: Price,
    pub timestamp: i64,
}
