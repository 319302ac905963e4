//! Observer sink abstraction
//!
//! The transport that carries market data to subscribers is opaque to
//! the pipeline: anything that can publish a trade and a depth update
//! qualifies. The WebSocket hub in the gateway is the production
//! implementation.

use types::depth::BookLevel;
use types::trade::Trade;

pub trait ObserverSink: Send + Sync {
    /// Publish one executed trade.
    fn broadcast_trade(&self, trade: &Trade);

    /// Publish a top-of-book snapshot, up to 10 levels per side.
    fn broadcast_orderbook_update(&self, symbol: &str, bids: &[BookLevel], asks: &[BookLevel]);

    /// Currently connected observers.
    fn client_count(&self) -> usize;
}

/// Sink that discards everything. Used headless and in tests.
#[derive(Debug, Default)]
pub struct NullSink;

impl ObserverSink for NullSink {
    fn broadcast_trade(&self, _trade: &Trade) {}

    fn broadcast_orderbook_update(&self, _symbol: &str, _bids: &[BookLevel], _asks: &[BookLevel]) {}

    fn client_count(&self) -> usize {
        0
    }
}
