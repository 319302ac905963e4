//! Per-symbol trade tape
//!
//! Bounded ring of recent trades backing the query surface, maintained
//! at publish time and re-seeded from the log during recovery. The ring
//! means recent-trade queries never touch the WAL.

use std::collections::VecDeque;
use types::trade::Trade;

/// Default ring capacity per symbol.
pub const DEFAULT_TRADE_HISTORY: usize = 1000;

#[derive(Debug)]
pub struct TradeTape {
    symbol: String,
    history: VecDeque<Trade>,
    max_history: usize,
}

impl TradeTape {
    pub fn new(symbol: impl Into<String>, max_history: usize) -> Self {
        Self {
            symbol: symbol.into(),
            history: VecDeque::with_capacity(max_history.min(1024)),
            max_history,
        }
    }

    /// Record a trade, evicting the oldest when at capacity.
    pub fn record(&mut self, trade: Trade) {
        if self.history.len() >= self.max_history {
            self.history.pop_front();
        }
        self.history.push_back(trade);
    }

    /// Most recent trades, newest first.
    pub fn recent(&self, limit: usize) -> Vec<Trade> {
        self.history.iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}
