//! Aggregated book-depth levels

use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};

/// One price level of a depth snapshot: total resting quantity at a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: Price,
    pub quantity: Quantity,
}

impl BookLevel {
    pub fn new(price: Price, quantity: Quantity) -> Self {
        Self { price, quantity }
    }
}
