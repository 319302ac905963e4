//! Engine orchestration
//!
//! Owns every subcomponent — per-symbol books and stop managers, the
//! WAL, the broadcast queue, the trade tapes — and runs the per-request
//! pipeline: validate → log → match → log trades → enqueue broadcast →
//! respond. Recovery replays the log into the same registries before
//! the request boundary opens.

pub mod engine;
pub mod recovery;

pub use engine::{
    CancelOutcome, Engine, EngineStats, NewOrder, NewStopOrder, OrderBookSnapshot, SubmitOutcome,
    SymbolQuote,
};
pub use recovery::{rebuild, recover, RecoveredState};
