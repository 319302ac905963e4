//! Fee schedule and per-trade fee computation
//!
//! Fees are charged in whole quote units: `notional × bps / 10^4` under
//! truncating integer division, computed independently per trade.

use crate::numeric::{notional, Price, Quantity};
use serde::{Deserialize, Serialize};

const BPS_DENOMINATOR: i64 = 10_000;

/// Maker/taker fee rates in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub maker_bps: i64,
    pub taker_bps: i64,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            maker_bps: 10,
            taker_bps: 20,
        }
    }
}

impl FeeSchedule {
    /// Compute `(maker_fee, taker_fee)` for a fill.
    pub fn compute(&self, price: Price, quantity: Quantity) -> (i64, i64) {
        let value = notional(price, quantity);
        (
            value * self.maker_bps / BPS_DENOMINATOR,
            value * self.taker_bps / BPS_DENOMINATOR,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rates() {
        let fees = FeeSchedule::default();
        assert_eq!(fees.maker_bps, 10);
        assert_eq!(fees.taker_bps, 20);
    }

    #[test]
    fn test_fee_computation() {
        // notional = 5000, maker 10bps → 5, taker 20bps → 10
        let fees = FeeSchedule::default();
        let (maker, taker) =
            fees.compute(Price::from_minor(1_000_000), Quantity::from_minor(500_000));
        assert_eq!(maker, 5);
        assert_eq!(taker, 10);
    }

    #[test]
    fn test_fee_truncation() {
        // notional = 999 → maker fee 999*10/10000 = 0 (truncated)
        let fees = FeeSchedule::default();
        let (maker, taker) =
            fees.compute(Price::from_minor(99_900), Quantity::from_minor(1_000_000));
        assert_eq!(maker, 0);
        assert_eq!(taker, 1);
    }
}
