//! Observer wire messages
//!
//! The two shapes pushed to subscribers. Prices and quantities are
//! floating-point majors on the wire; ordering across messages is by the
//! embedded timestamps, not delivery order.

use serde::{Deserialize, Serialize};
use types::depth::BookLevel;
use types::order::Side;
use types::time::now_ns;
use types::trade::Trade;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ObserverMessage {
    Trade(TradeData),
    Orderbook(BookData),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeData {
    pub trade_id: String,
    pub symbol: String,
    pub price: f64,
    pub quantity: f64,
    pub aggressor_side: Side,
    pub maker_order_id: String,
    pub taker_order_id: String,
    pub maker_fee: i64,
    pub taker_fee: i64,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookData {
    pub symbol: String,
    pub bids: Vec<LevelData>,
    pub asks: Vec<LevelData>,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub price: f64,
    pub quantity: f64,
}

impl From<&BookLevel> for LevelData {
    fn from(level: &BookLevel) -> Self {
        Self {
            price: level.price.as_major(),
            quantity: level.quantity.as_units(),
        }
    }
}

impl ObserverMessage {
    pub fn trade(trade: &Trade) -> Self {
        Self::Trade(TradeData {
            trade_id: trade.trade_id.clone(),
            symbol: trade.symbol.clone(),
            price: trade.price.as_major(),
            quantity: trade.quantity.as_units(),
            aggressor_side: trade.aggressor_side,
            maker_order_id: trade.maker_order_id.clone(),
            taker_order_id: trade.taker_order_id.clone(),
            maker_fee: trade.maker_fee,
            taker_fee: trade.taker_fee,
            timestamp: trade.timestamp_iso.clone(),
        })
    }

    pub fn orderbook(symbol: &str, bids: &[BookLevel], asks: &[BookLevel]) -> Self {
        Self::Orderbook(BookData {
            symbol: symbol.to_string(),
            bids: bids.iter().map(LevelData::from).collect(),
            asks: asks.iter().map(LevelData::from).collect(),
            timestamp: now_ns(),
        })
    }

    /// Symbol this message concerns.
    pub fn symbol(&self) -> &str {
        match self {
            Self::Trade(data) => &data.symbol,
            Self::Orderbook(data) => &data.symbol,
        }
    }
}
