//! Durable event log
//!
//! Append-only write-ahead log with an asynchronous writer thread and a
//! deterministic replay reader. Producers never block on disk I/O; the
//! only contention is the queue-push critical section. The records on
//! disk are line-delimited JSON, one event per newline-terminated line.

pub mod replay;
pub mod wal;

pub use replay::{replay, Replay};
pub use wal::{CancelRecord, Wal, WalError, WalEvent, WalRecord};
