//! Trade construction
//!
//! Mints trade ids from a shared monotonic sequence and stamps each fill
//! with fees from the schedule. One executor is cloned into every book so
//! trade ids stay unique across symbols.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use types::fee::FeeSchedule;
use types::numeric::{Price, Quantity};
use types::order::Side;
use types::time::now_iso;
use types::trade::Trade;

#[derive(Debug, Clone)]
pub struct MatchExecutor {
    sequence: Arc<AtomicU64>,
    fees: FeeSchedule,
}

impl MatchExecutor {
    pub fn new(fees: FeeSchedule) -> Self {
        Self::with_sequence(fees, Arc::new(AtomicU64::new(0)))
    }

    /// Build around an externally owned sequence, so recovery can seed it
    /// past every replayed trade id.
    pub fn with_sequence(fees: FeeSchedule, sequence: Arc<AtomicU64>) -> Self {
        Self { sequence, fees }
    }

    fn next_trade_id(&self) -> String {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        format!("T-{id}")
    }

    /// Build the trade for one fill. Execution price is the maker's level
    /// price; the aggressor side is the taker's.
    pub fn execute_trade(
        &self,
        symbol: &str,
        maker_order_id: &str,
        taker_order_id: &str,
        aggressor_side: Side,
        price: Price,
        quantity: Quantity,
    ) -> Trade {
        let (maker_fee, taker_fee) = self.fees.compute(price, quantity);
        Trade {
            trade_id: self.next_trade_id(),
            symbol: symbol.to_string(),
            price,
            quantity,
            aggressor_side,
            maker_order_id: maker_order_id.to_string(),
            taker_order_id: taker_order_id.to_string(),
            maker_fee,
            taker_fee,
            timestamp_iso: now_iso(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_ids_monotonic() {
        let executor = MatchExecutor::new(FeeSchedule::default());
        let t1 = executor.execute_trade(
            "BTC-USDT",
            "ORD-1",
            "ORD-2",
            Side::Buy,
            Price::from_minor(1_000_000),
            Quantity::from_minor(500_000),
        );
        let t2 = executor.execute_trade(
            "BTC-USDT",
            "ORD-1",
            "ORD-3",
            Side::Buy,
            Price::from_minor(1_000_000),
            Quantity::from_minor(100_000),
        );
        assert_eq!(t1.trade_id, "T-1");
        assert_eq!(t2.trade_id, "T-2");
    }

    #[test]
    fn test_ids_unique_across_clones() {
        let executor = MatchExecutor::new(FeeSchedule::default());
        let clone = executor.clone();
        let t1 = executor.execute_trade(
            "BTC-USDT",
            "A",
            "B",
            Side::Sell,
            Price::from_minor(100),
            Quantity::from_minor(1),
        );
        let t2 = clone.execute_trade(
            "ETH-USDT",
            "C",
            "D",
            Side::Sell,
            Price::from_minor(100),
            Quantity::from_minor(1),
        );
        assert_ne!(t1.trade_id, t2.trade_id);
    }

    #[test]
    fn test_fees_stamped_per_trade() {
        let executor = MatchExecutor::new(FeeSchedule::default());
        let trade = executor.execute_trade(
            "BTC-USDT",
            "ORD-1",
            "ORD-2",
            Side::Buy,
            Price::from_minor(1_000_000),
            Quantity::from_minor(500_000),
        );
        assert_eq!(trade.maker_fee, 5);
        assert_eq!(trade.taker_fee, 10);
    }

    #[test]
    fn test_seeded_sequence_continues() {
        let seq = Arc::new(AtomicU64::new(41));
        let executor = MatchExecutor::with_sequence(FeeSchedule::default(), seq);
        let trade = executor.execute_trade(
            "BTC-USDT",
            "A",
            "B",
            Side::Buy,
            Price::from_minor(100),
            Quantity::from_minor(1),
        );
        assert_eq!(trade.trade_id, "T-42");
    }
}
