//! Fixed-scale integer numerics for prices and quantities
//!
//! All monetary math is integer math. Prices are stored in minor units at
//! scale 10^2 (cents); quantities at scale 10^6 (microunits). The wire
//! format uses floating-point majors; conversion happens at the boundary
//! and nowhere else.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Minor units per major price unit (10^2).
pub const PRICE_SCALE: i64 = 100;

/// Microunits per whole quantity unit (10^6).
pub const QTY_SCALE: i64 = 1_000_000;

/// Price in minor units (cents).
///
/// A zero price is legal and marks a market order; limit prices must be
/// positive, which is enforced at the request boundary.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    pub const ZERO: Price = Price(0);

    /// Create from minor units (cents).
    pub const fn from_minor(v: i64) -> Self {
        Self(v)
    }

    /// Convert a wire-format major price, truncating sub-cent precision.
    pub fn from_major(v: f64) -> Self {
        Self((v * PRICE_SCALE as f64) as i64)
    }

    pub const fn as_minor(&self) -> i64 {
        self.0
    }

    pub fn as_major(&self) -> f64 {
        self.0 as f64 / PRICE_SCALE as f64
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Quantity in microunits.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Quantity(i64);

impl Quantity {
    pub const ZERO: Quantity = Quantity(0);

    /// Create from microunits.
    pub const fn from_minor(v: i64) -> Self {
        Self(v)
    }

    /// Convert a wire-format quantity in whole units, truncating below
    /// one microunit.
    pub fn from_units(v: f64) -> Self {
        Self((v * QTY_SCALE as f64) as i64)
    }

    pub const fn as_minor(&self) -> i64 {
        self.0
    }

    pub fn as_units(&self) -> f64 {
        self.0 as f64 / QTY_SCALE as f64
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }

    /// Subtract without going negative.
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self((self.0 - rhs.0).max(0))
    }
}

impl Add for Quantity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Quantity {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Quantity {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Quantity {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Notional value of a fill in whole quote units, truncated:
/// `(price_minor × quantity_minor) / 10^8`.
///
/// The intermediate product is widened to i128; a full-size price against
/// a full-size quantity overflows i64.
pub fn notional(price: Price, quantity: Quantity) -> i64 {
    let product = price.as_minor() as i128 * quantity.as_minor() as i128;
    (product / (PRICE_SCALE as i128 * QTY_SCALE as i128)) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_major_conversion() {
        let p = Price::from_major(10000.0);
        assert_eq!(p.as_minor(), 1_000_000);
        assert_eq!(p.as_major(), 10000.0);
    }

    #[test]
    fn test_price_major_truncates() {
        // Sub-cent precision is dropped, not rounded
        let p = Price::from_major(1.239);
        assert_eq!(p.as_minor(), 123);
    }

    #[test]
    fn test_quantity_unit_conversion() {
        let q = Quantity::from_units(0.5);
        assert_eq!(q.as_minor(), 500_000);
        assert_eq!(q.as_units(), 0.5);
    }

    #[test]
    fn test_quantity_arithmetic() {
        let mut q = Quantity::from_minor(500_000);
        q -= Quantity::from_minor(300_000);
        assert_eq!(q, Quantity::from_minor(200_000));
        q += Quantity::from_minor(100_000);
        assert_eq!(q, Quantity::from_minor(300_000));
    }

    #[test]
    fn test_saturating_sub() {
        let q = Quantity::from_minor(100);
        assert_eq!(q.saturating_sub(Quantity::from_minor(500)), Quantity::ZERO);
    }

    #[test]
    fn test_notional_truncates() {
        // 0.5 units at 10000.00 → 5000 whole quote units
        let n = notional(Price::from_minor(1_000_000), Quantity::from_minor(500_000));
        assert_eq!(n, 5000);

        // Fractional remainder truncates
        let n = notional(Price::from_minor(101), Quantity::from_minor(500_000));
        assert_eq!(n, 0);
    }

    #[test]
    fn test_notional_large_values_no_overflow() {
        let n = notional(
            Price::from_minor(9_200_000_000),
            Quantity::from_minor(1_000_000_000_000),
        );
        assert_eq!(n, 92_000_000_000_000);
    }

    #[test]
    fn test_serde_transparent() {
        let p = Price::from_minor(1_000_000);
        assert_eq!(serde_json::to_string(&p).unwrap(), "1000000");
        let q: Quantity = serde_json::from_str("500000").unwrap();
        assert_eq!(q, Quantity::from_minor(500_000));
    }
}
