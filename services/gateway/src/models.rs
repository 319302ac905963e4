//! Wire DTOs
//!
//! Prices and quantities are floating-point majors on the wire and
//! scaled integers everywhere else; conversion happens here and only
//! here. Request fields are optional so missing-field errors surface as
//! 400s with a message naming the field.

use engine::SubmitOutcome;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use types::depth::BookLevel;
use types::order::{Order, OrderStatus, OrderType, Side};
use types::stop::StopOrder;
use types::time::ns_to_iso;
use types::trade::Trade;

// ── Requests ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub symbol: Option<String>,
    pub order_type: Option<String>,
    pub side: Option<String>,
    pub quantity: Option<f64>,
    pub price: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateStopOrderRequest {
    pub symbol: Option<String>,
    pub stop_type: Option<String>,
    pub side: Option<String>,
    pub quantity: Option<f64>,
    pub trigger_price: Option<f64>,
    pub limit_price: Option<f64>,
    pub trail_amount: Option<f64>,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DepthQuery {
    pub depth: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct TradesQuery {
    pub limit: Option<usize>,
}

// ── Responses ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct OrderView {
    pub order_id: String,
    pub symbol: String,
    pub order_type: OrderType,
    pub side: Side,
    pub quantity: f64,
    pub price: f64,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
}

impl OrderView {
    pub fn new(order: &Order, status: Option<OrderStatus>) -> Self {
        Self {
            order_id: order.order_id.clone(),
            symbol: order.symbol.clone(),
            order_type: order.order_type,
            side: order.side,
            quantity: order.quantity.as_units(),
            price: order.price.as_major(),
            timestamp: ns_to_iso(order.timestamp),
            status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TradeView {
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

impl From<&Trade> for TradeView {
    fn from(trade: &Trade) -> Self {
        Self {
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
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub order: OrderView,
    pub trades: Vec<TradeView>,
    pub filled_quantity: f64,
    pub remaining_quantity: f64,
}

impl From<SubmitOutcome> for CreateOrderResponse {
    fn from(outcome: SubmitOutcome) -> Self {
        Self {
            order: OrderView::new(&outcome.order, Some(outcome.status)),
            trades: outcome.trades.iter().map(TradeView::from).collect(),
            filled_quantity: outcome.filled_quantity.as_units(),
            remaining_quantity: outcome.remaining_quantity.as_units(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StopOrderView {
    pub order_id: String,
    pub symbol: String,
    pub stop_type: types::stop::StopType,
    pub side: Side,
    pub quantity: f64,
    pub trigger_price: f64,
    pub limit_price: f64,
    pub trail_amount: f64,
    pub timestamp: String,
}

impl From<&StopOrder> for StopOrderView {
    fn from(stop: &StopOrder) -> Self {
        Self {
            order_id: stop.order_id.clone(),
            symbol: stop.symbol.clone(),
            stop_type: stop.stop_type,
            side: stop.side,
            quantity: stop.quantity.as_units(),
            trigger_price: stop.trigger_price.as_major(),
            limit_price: stop.limit_price.as_major(),
            trail_amount: stop.trail_amount.as_major(),
            timestamp: ns_to_iso(stop.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateStopOrderResponse {
    pub status: &'static str,
    pub stop_order_id: String,
    pub order: StopOrderView,
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub cancelled: bool,
    pub order_id: String,
    pub symbol: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct LevelView {
    pub price: f64,
    pub quantity: f64,
    pub total: f64,
}

impl From<&BookLevel> for LevelView {
    fn from(level: &BookLevel) -> Self {
        let price = level.price.as_major();
        let quantity = level.quantity.as_units();
        Self {
            price,
            quantity,
            total: price * quantity,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderBookResponse {
    pub symbol: String,
    pub bids: Vec<LevelView>,
    pub asks: Vec<LevelView>,
    pub best_bid: Option<f64>,
    pub best_ask: Option<f64>,
    pub spread: Option<f64>,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct TradesResponse {
    pub symbol: String,
    pub trades: Vec<TradeView>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct SymbolsResponse {
    pub symbols: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_seconds: u64,
    pub ws_clients: usize,
}

#[derive(Debug, Serialize)]
pub struct QuoteView {
    pub best_bid: Option<f64>,
    pub best_ask: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_orders: u64,
    pub total_trades: u64,
    pub ws_clients: usize,
    pub symbols_count: usize,
    pub symbols: BTreeMap<String, QuoteView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::numeric::{Price, Quantity};

    #[test]
    fn test_order_view_converts_to_majors() {
        let order = Order {
            order_id: "ORD-1".into(),
            symbol: "BTC-USDT".into(),
            order_type: OrderType::Limit,
            side: Side::Buy,
            quantity: Quantity::from_minor(500_000),
            price: Price::from_minor(1_000_000),
            timestamp: 1_708_123_456_789_000_000,
        };
        let view = OrderView::new(&order, Some(OrderStatus::Open));
        assert_eq!(view.quantity, 0.5);
        assert_eq!(view.price, 10000.0);

        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("\"status\":\"open\""));
    }

    #[test]
    fn test_level_view_total() {
        let level = BookLevel::new(Price::from_minor(1_000_000), Quantity::from_minor(500_000));
        let view = LevelView::from(&level);
        assert_eq!(view.total, 5000.0);
    }

    #[test]
    fn test_missing_fields_deserialize_as_none() {
        let req: CreateOrderRequest = serde_json::from_str("{}").unwrap();
        assert!(req.symbol.is_none());
        assert!(req.price.is_none());
    }
}
