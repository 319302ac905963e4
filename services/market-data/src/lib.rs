//! Market-data fan-out
//!
//! Decouples matching latency from observer I/O: a broadcast queue
//! dispatches trade and book-depth messages to an opaque observer sink
//! from a worker pool, and per-symbol trade tapes keep bounded recent
//! history for the query surface.

pub mod broadcast;
pub mod messages;
pub mod sink;
pub mod trades;

pub use broadcast::{BroadcastMessage, BroadcastQueue};
pub use messages::ObserverMessage;
pub use sink::{NullSink, ObserverSink};
pub use trades::TradeTape;
