//! Bid (buy-side) ladder
//!
//! Buy orders keyed by price; the best bid is the highest key. A BTreeMap
//! keeps iteration deterministic; descending order is a property of how
//! the ladder is walked, not of the key.

use std::collections::BTreeMap;
use types::depth::BookLevel;
use types::numeric::{Price, Quantity};

use super::price_level::PriceLevel;

#[derive(Debug, Clone, Default)]
pub struct BidBook {
    levels: BTreeMap<Price, PriceLevel>,
}

impl BidBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rest an order at the tail of its price level.
    pub fn insert(&mut self, price: Price, order_id: String, quantity: Quantity) {
        self.levels
            .entry(price)
            .or_default()
            .push_back(order_id, quantity);
    }

    /// Remove an order by id at a known price. Empty levels are dropped.
    pub fn remove(&mut self, order_id: &str, price: Price) -> bool {
        if let Some(level) = self.levels.get_mut(&price) {
            if level.remove(order_id).is_some() {
                if level.is_empty() {
                    self.levels.remove(&price);
                }
                return true;
            }
        }
        false
    }

    /// Best (highest) bid price.
    pub fn best_price(&self) -> Option<Price> {
        self.levels.keys().next_back().copied()
    }

    /// Mutable access to the best bid level.
    pub fn best_level_mut(&mut self) -> Option<(Price, &mut PriceLevel)> {
        self.levels
            .iter_mut()
            .next_back()
            .map(|(price, level)| (*price, level))
    }

    pub fn remove_level(&mut self, price: Price) {
        self.levels.remove(&price);
    }

    pub fn level(&self, price: Price) -> Option<&PriceLevel> {
        self.levels.get(&price)
    }

    /// Quantity fillable by a sell taker, honoring its price gate: levels
    /// below `limit` do not count. The walk stops once `want` is covered.
    pub fn fillable(&self, limit: Option<Price>, want: Quantity) -> Quantity {
        let mut total = Quantity::ZERO;
        for (price, level) in self.levels.iter().rev() {
            if let Some(gate) = limit {
                if *price < gate {
                    break;
                }
            }
            total += level.total_quantity();
            if total >= want {
                break;
            }
        }
        total
    }

    /// Top `depth` levels, best first, quantity aggregated per level.
    pub fn depth_snapshot(&self, depth: usize) -> Vec<BookLevel> {
        self.levels
            .iter()
            .rev()
            .take(depth)
            .map(|(price, level)| BookLevel::new(*price, level.total_quantity()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(v: i64) -> Price {
        Price::from_minor(v)
    }

    fn q(v: i64) -> Quantity {
        Quantity::from_minor(v)
    }

    #[test]
    fn test_best_bid_is_highest() {
        let mut book = BidBook::new();
        book.insert(p(900_000), "A".into(), q(100));
        book.insert(p(910_000), "B".into(), q(100));
        book.insert(p(890_000), "C".into(), q(100));

        assert_eq!(book.best_price(), Some(p(910_000)));
    }

    #[test]
    fn test_remove_drops_empty_level() {
        let mut book = BidBook::new();
        book.insert(p(900_000), "A".into(), q(100));

        assert!(book.remove("A", p(900_000)));
        assert!(book.is_empty());
        assert!(!book.remove("A", p(900_000)));
    }

    #[test]
    fn test_depth_snapshot_descending() {
        let mut book = BidBook::new();
        book.insert(p(900_000), "A".into(), q(100));
        book.insert(p(910_000), "B".into(), q(200));
        book.insert(p(890_000), "C".into(), q(300));

        let depth = book.depth_snapshot(2);
        assert_eq!(depth.len(), 2);
        assert_eq!(depth[0].price, p(910_000));
        assert_eq!(depth[1].price, p(900_000));
    }

    #[test]
    fn test_depth_aggregates_level_quantity() {
        let mut book = BidBook::new();
        book.insert(p(900_000), "A".into(), q(100));
        book.insert(p(900_000), "B".into(), q(250));

        let depth = book.depth_snapshot(10);
        assert_eq!(depth.len(), 1);
        assert_eq!(depth[0].quantity, q(350));
    }

    #[test]
    fn test_fillable_respects_gate() {
        let mut book = BidBook::new();
        book.insert(p(900_000), "A".into(), q(100));
        book.insert(p(880_000), "B".into(), q(100));

        // A sell at 890_000 may only hit the 900_000 level
        assert_eq!(book.fillable(Some(p(890_000)), q(1_000)), q(100));
        assert_eq!(book.fillable(None, q(1_000)), q(200));
    }
}
