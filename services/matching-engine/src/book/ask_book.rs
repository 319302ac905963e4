//! Ask (sell-side) ladder
//!
//! Sell orders keyed by price; the best ask is the lowest key.

use std::collections::BTreeMap;
use types::depth::BookLevel;
use types::numeric::{Price, Quantity};

use super::price_level::PriceLevel;

#[derive(Debug, Clone, Default)]
pub struct AskBook {
    levels: BTreeMap<Price, PriceLevel>,
}

impl AskBook {
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

    /// Best (lowest) ask price.
    pub fn best_price(&self) -> Option<Price> {
        self.levels.keys().next().copied()
    }

    /// Mutable access to the best ask level.
    pub fn best_level_mut(&mut self) -> Option<(Price, &mut PriceLevel)> {
        self.levels
            .iter_mut()
            .next()
            .map(|(price, level)| (*price, level))
    }

    pub fn remove_level(&mut self, price: Price) {
        self.levels.remove(&price);
    }

    pub fn level(&self, price: Price) -> Option<&PriceLevel> {
        self.levels.get(&price)
    }

    /// Quantity fillable by a buy taker, honoring its price gate: levels
    /// above `limit` do not count. The walk stops once `want` is covered.
    pub fn fillable(&self, limit: Option<Price>, want: Quantity) -> Quantity {
        let mut total = Quantity::ZERO;
        for (price, level) in self.levels.iter() {
            if let Some(gate) = limit {
                if *price > gate {
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
    fn test_best_ask_is_lowest() {
        let mut book = AskBook::new();
        book.insert(p(1_010_000), "A".into(), q(100));
        book.insert(p(1_000_000), "B".into(), q(100));
        book.insert(p(1_020_000), "C".into(), q(100));

        assert_eq!(book.best_price(), Some(p(1_000_000)));
    }

    #[test]
    fn test_depth_snapshot_ascending() {
        let mut book = AskBook::new();
        book.insert(p(1_010_000), "A".into(), q(100));
        book.insert(p(1_000_000), "B".into(), q(200));

        let depth = book.depth_snapshot(10);
        assert_eq!(depth[0].price, p(1_000_000));
        assert_eq!(depth[1].price, p(1_010_000));
    }

    #[test]
    fn test_fillable_respects_gate() {
        let mut book = AskBook::new();
        book.insert(p(1_000_000), "A".into(), q(300_000));
        book.insert(p(1_200_000), "B".into(), q(300_000));

        // A buy at 1_100_000 may only hit the 1_000_000 level
        assert_eq!(book.fillable(Some(p(1_100_000)), q(1_000_000)), q(300_000));
        assert_eq!(book.fillable(None, q(1_000_000)), q(600_000));
    }

    #[test]
    fn test_fillable_stops_early_when_covered() {
        let mut book = AskBook::new();
        book.insert(p(1_000_000), "A".into(), q(500_000));
        book.insert(p(1_010_000), "B".into(), q(500_000));

        let fillable = book.fillable(None, q(400_000));
        assert!(fillable >= q(400_000));
    }
}
