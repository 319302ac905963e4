//! Price level with FIFO queue
//!
//! A price level holds every resting order at one price point, in strict
//! arrival order. A partially filled maker keeps its place at the head;
//! there is no reordering.

use std::collections::VecDeque;
use types::numeric::Quantity;

/// A resting order entry: id plus unfilled remainder.
#[derive(Debug, Clone)]
struct RestingOrder {
    order_id: String,
    quantity: Quantity,
}

/// All orders resting at one price, FIFO by arrival.
#[derive(Debug, Clone, Default)]
pub struct PriceLevel {
    orders: VecDeque<RestingOrder>,
    total_quantity: Quantity,
}

impl PriceLevel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an order at the tail (time priority).
    pub fn push_back(&mut self, order_id: String, quantity: Quantity) {
        self.orders.push_back(RestingOrder { order_id, quantity });
        self.total_quantity += quantity;
    }

    /// Remove an order by id, wherever it sits in the queue.
    ///
    /// Returns the removed remainder, or None if the id is not here.
    pub fn remove(&mut self, order_id: &str) -> Option<Quantity> {
        let position = self.orders.iter().position(|o| o.order_id == order_id)?;
        let entry = self.orders.remove(position)?;
        self.total_quantity -= entry.quantity;
        Some(entry.quantity)
    }

    /// Head of the queue: `(order_id, remaining quantity)`.
    pub fn peek_front(&self) -> Option<(&str, Quantity)> {
        self.orders
            .front()
            .map(|o| (o.order_id.as_str(), o.quantity))
    }

    /// Consume `quantity` from the head order. When the head reaches
    /// zero it is popped; otherwise it stays at the head.
    ///
    /// Returns true if the head order was fully consumed and popped.
    pub fn fill_front(&mut self, quantity: Quantity) -> bool {
        let Some(front) = self.orders.front_mut() else {
            return false;
        };
        front.quantity = front.quantity.saturating_sub(quantity);
        self.total_quantity = self.total_quantity.saturating_sub(quantity);
        if front.quantity.is_zero() {
            self.orders.pop_front();
            true
        } else {
            false
        }
    }

    /// Remaining quantity of a specific order at this level.
    pub fn quantity_of(&self, order_id: &str) -> Option<Quantity> {
        self.orders
            .iter()
            .find(|o| o.order_id == order_id)
            .map(|o| o.quantity)
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn total_quantity(&self) -> Quantity {
        self.total_quantity
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(v: i64) -> Quantity {
        Quantity::from_minor(v)
    }

    #[test]
    fn test_push_and_totals() {
        let mut level = PriceLevel::new();
        level.push_back("A".into(), q(300_000));
        level.push_back("B".into(), q(200_000));

        assert_eq!(level.order_count(), 2);
        assert_eq!(level.total_quantity(), q(500_000));
    }

    #[test]
    fn test_fifo_order_preserved() {
        let mut level = PriceLevel::new();
        level.push_back("A".into(), q(100));
        level.push_back("B".into(), q(200));

        let (id, qty) = level.peek_front().unwrap();
        assert_eq!(id, "A");
        assert_eq!(qty, q(100));
    }

    #[test]
    fn test_fill_front_partial_keeps_head() {
        let mut level = PriceLevel::new();
        level.push_back("A".into(), q(500));
        level.push_back("B".into(), q(100));

        let popped = level.fill_front(q(200));
        assert!(!popped);
        // A remains at the head with its remainder
        let (id, qty) = level.peek_front().unwrap();
        assert_eq!(id, "A");
        assert_eq!(qty, q(300));
        assert_eq!(level.total_quantity(), q(400));
    }

    #[test]
    fn test_fill_front_exact_pops() {
        let mut level = PriceLevel::new();
        level.push_back("A".into(), q(500));
        level.push_back("B".into(), q(100));

        let popped = level.fill_front(q(500));
        assert!(popped);
        assert_eq!(level.peek_front().unwrap().0, "B");
    }

    #[test]
    fn test_remove_mid_queue() {
        let mut level = PriceLevel::new();
        level.push_back("A".into(), q(100));
        level.push_back("B".into(), q(200));
        level.push_back("C".into(), q(300));

        assert_eq!(level.remove("B"), Some(q(200)));
        assert_eq!(level.remove("B"), None);
        assert_eq!(level.order_count(), 2);
        assert_eq!(level.total_quantity(), q(400));
    }
}
