//! Price-gate predicate
//!
//! Determines whether an incoming taker may trade against a given level.
//! Market takers skip the gate entirely.

use types::numeric::Price;
use types::order::{OrderType, Side};

/// Whether a taker with `taker_price` may lift the level at `level_price`.
///
/// For limit/IOC/FOK takers: a buyer matches levels at or below its
/// price, a seller levels at or above. Market takers always match.
pub fn crosses(order_type: OrderType, side: Side, taker_price: Price, level_price: Price) -> bool {
    if !order_type.requires_price() {
        return true;
    }
    match side {
        Side::Buy => level_price <= taker_price,
        Side::Sell => level_price >= taker_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(v: i64) -> Price {
        Price::from_minor(v)
    }

    #[test]
    fn test_buy_limit_gate() {
        assert!(crosses(OrderType::Limit, Side::Buy, p(100), p(100)));
        assert!(crosses(OrderType::Limit, Side::Buy, p(100), p(99)));
        assert!(!crosses(OrderType::Limit, Side::Buy, p(100), p(101)));
    }

    #[test]
    fn test_sell_limit_gate() {
        assert!(crosses(OrderType::Limit, Side::Sell, p(100), p(100)));
        assert!(crosses(OrderType::Limit, Side::Sell, p(100), p(101)));
        assert!(!crosses(OrderType::Limit, Side::Sell, p(100), p(99)));
    }

    #[test]
    fn test_market_skips_gate() {
        assert!(crosses(OrderType::Market, Side::Buy, Price::ZERO, p(101)));
        assert!(crosses(OrderType::Market, Side::Sell, Price::ZERO, p(1)));
    }

    #[test]
    fn test_ioc_and_fok_use_gate() {
        assert!(!crosses(OrderType::Ioc, Side::Buy, p(100), p(101)));
        assert!(!crosses(OrderType::Fok, Side::Sell, p(100), p(99)));
    }
}
