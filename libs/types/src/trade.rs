//! Trade execution types

use crate::numeric::{Price, Quantity};
use crate::order::Side;
use serde::{Deserialize, Serialize};

/// An atomic exchange between a resting maker and an incoming taker.
///
/// Trades are values: once emitted and published, nothing owns them.
/// Fees are whole quote units under truncating division.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: String,
    pub symbol: String,
    pub price: Price,
    pub quantity: Quantity,
    pub aggressor_side: Side,
    pub maker_order_id: String,
    pub taker_order_id: String,
    pub maker_fee: i64,
    pub taker_fee: i64,
    #[serde(rename = "timestamp")]
    pub timestamp_iso: String,
}

impl Trade {
    /// Notional value in whole quote units (truncated).
    pub fn notional(&self) -> i64 {
        crate::numeric::notional(self.price, self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_serde_timestamp_field() {
        let trade = Trade {
            trade_id: "T-1".into(),
            symbol: "BTC-USDT".into(),
            price: Price::from_minor(1_000_000),
            quantity: Quantity::from_minor(500_000),
            aggressor_side: Side::Buy,
            maker_order_id: "ORD-1".into(),
            taker_order_id: "ORD-2".into(),
            maker_fee: 5,
            taker_fee: 10,
            timestamp_iso: "2026-02-17T00:00:00.000000000Z".into(),
        };
        let json = serde_json::to_string(&trade).unwrap();
        assert!(json.contains("\"timestamp\":\"2026-02-17"));
        assert!(!json.contains("timestamp_iso"));
        let back: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade, back);
    }

    #[test]
    fn test_trade_notional() {
        let trade = Trade {
            trade_id: "T-1".into(),
            symbol: "BTC-USDT".into(),
            price: Price::from_minor(1_000_000),
            quantity: Quantity::from_minor(500_000),
            aggressor_side: Side::Sell,
            maker_order_id: "ORD-1".into(),
            taker_order_id: "ORD-2".into(),
            maker_fee: 0,
            taker_fee: 0,
            timestamp_iso: String::new(),
        };
        assert_eq!(trade.notional(), 5000);
    }
}
