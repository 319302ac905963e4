//! Write-ahead log
//!
//! Every state-changing event is serialized by the producer, pushed onto
//! a shared queue, and drained in batches by a single writer thread that
//! flushes once per batch. `append` returning means the event is queued,
//! not yet durable; `stop` drains stragglers and performs the final
//! flush. A crash before the drain loses the unflushed tail — that is
//! the explicit durability trade for latency isolation.

use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use thiserror::Error;
use tracing::{error, info};
use types::order::Order;
use types::stop::StopOrder;
use types::time::now_ns;
use types::trade::Trade;

#[derive(Error, Debug)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Cancel event payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelRecord {
    pub order_id: String,
    pub reason: String,
}

/// One state-changing event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum WalEvent {
    Order(Order),
    StopOrder(StopOrder),
    Trade(Trade),
    Cancel(CancelRecord),
}

/// One persisted line: `{type, timestamp, payload}`. The timestamp is
/// the producer's wall time in nanoseconds at enqueue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalRecord {
    pub timestamp: i64,
    #[serde(flatten)]
    pub event: WalEvent,
}

struct WalQueue {
    lines: VecDeque<String>,
    stopping: bool,
}

struct LogFile {
    writer: Option<BufWriter<File>>,
    path: PathBuf,
}

impl LogFile {
    fn open(path: &Path) -> Result<Self, WalError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: Some(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Write a batch and flush once. Failures are logged and swallowed;
    /// producers must never die on a disk error.
    fn write_batch(&mut self, lines: &[String]) {
        if lines.is_empty() {
            return;
        }
        let Some(writer) = self.writer.as_mut() else {
            return;
        };
        for line in lines {
            if let Err(e) = writeln!(writer, "{line}") {
                error!(error = %e, "WAL write failed; durability lost for batch");
                return;
            }
        }
        if let Err(e) = writer.flush() {
            error!(error = %e, "WAL flush failed");
        }
    }
}

struct WalShared {
    queue: Mutex<WalQueue>,
    cv: Condvar,
    file: Mutex<LogFile>,
    total_entries: AtomicU64,
    pending_writes: AtomicU64,
}

/// Asynchronous append-only event log.
pub struct Wal {
    shared: Arc<WalShared>,
    writer: Mutex<Option<JoinHandle<()>>>,
}

impl Wal {
    /// Open the log in append mode and start the writer thread.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, WalError> {
        let path = path.as_ref();
        let shared = Arc::new(WalShared {
            queue: Mutex::new(WalQueue {
                lines: VecDeque::new(),
                stopping: false,
            }),
            cv: Condvar::new(),
            file: Mutex::new(LogFile::open(path)?),
            total_entries: AtomicU64::new(0),
            pending_writes: AtomicU64::new(0),
        });

        let worker = Arc::clone(&shared);
        let handle = std::thread::Builder::new()
            .name("wal-writer".into())
            .spawn(move || writer_loop(worker))?;

        info!(path = %path.display(), "WAL opened");
        Ok(Self {
            shared,
            writer: Mutex::new(Some(handle)),
        })
    }

    /// Queue an event for the writer thread. Serialization happens on
    /// the caller, the lock is held only for the push.
    pub fn append(&self, event: WalEvent) {
        let record = WalRecord {
            timestamp: now_ns(),
            event,
        };
        let line = match serde_json::to_string(&record) {
            Ok(line) => line,
            Err(e) => {
                error!(error = %e, "failed to serialize WAL record");
                return;
            }
        };

        {
            let mut queue = self.shared.queue.lock();
            if queue.stopping {
                return;
            }
            queue.lines.push_back(line);
        }
        self.shared.total_entries.fetch_add(1, Ordering::Relaxed);
        self.shared.pending_writes.fetch_add(1, Ordering::Relaxed);
        self.shared.cv.notify_one();
    }

    pub fn append_order(&self, order: &Order) {
        self.append(WalEvent::Order(order.clone()));
    }

    pub fn append_stop_order(&self, stop: &StopOrder) {
        self.append(WalEvent::StopOrder(stop.clone()));
    }

    pub fn append_trade(&self, trade: &Trade) {
        self.append(WalEvent::Trade(trade.clone()));
    }

    pub fn append_cancel(&self, order_id: &str, reason: &str) {
        self.append(WalEvent::Cancel(CancelRecord {
            order_id: order_id.to_string(),
            reason: reason.to_string(),
        }));
    }

    /// Rename the live file to `<path>.<unix_ts>` and reopen the path
    /// fresh. Queued lines are drained into the old file first. Lines
    /// enqueued concurrently with the rename may land in the fresh file.
    pub fn rotate(&self) -> Result<PathBuf, WalError> {
        let mut file = self.shared.file.lock();

        let batch: Vec<String> = {
            let mut queue = self.shared.queue.lock();
            queue.lines.drain(..).collect()
        };
        let drained = batch.len() as u64;
        file.write_batch(&batch);
        self.shared
            .pending_writes
            .fetch_sub(drained, Ordering::Relaxed);

        // Close before renaming
        file.writer = None;
        let rotated = file
            .path
            .with_extension(format!("jsonl.{}", now_ns() / 1_000_000_000));
        fs::rename(&file.path, &rotated)?;

        let reopened = LogFile::open(&file.path)?;
        file.writer = reopened.writer;
        info!(rotated = %rotated.display(), "WAL rotated");
        Ok(rotated)
    }

    /// Signal the writer, drain stragglers, flush, and close the file.
    /// Idempotent.
    pub fn stop(&self) {
        {
            let mut queue = self.shared.queue.lock();
            queue.stopping = true;
        }
        self.shared.cv.notify_all();
        let handle = self.writer.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!("WAL writer thread panicked");
            }
        }
        self.shared.file.lock().writer = None;
    }

    /// Path of the live log file.
    pub fn path(&self) -> PathBuf {
        self.shared.file.lock().path.clone()
    }

    /// Events enqueued over the log's lifetime.
    pub fn total_entries(&self) -> u64 {
        self.shared.total_entries.load(Ordering::Relaxed)
    }

    /// Current queue depth awaiting the writer thread.
    pub fn pending_writes(&self) -> u64 {
        self.shared.pending_writes.load(Ordering::Relaxed)
    }
}

impl Drop for Wal {
    fn drop(&mut self) {
        self.stop();
    }
}

fn writer_loop(shared: Arc<WalShared>) {
    loop {
        // Wait for work without holding the file lock
        {
            let mut queue = shared.queue.lock();
            while queue.lines.is_empty() && !queue.stopping {
                shared.cv.wait(&mut queue);
            }
            if queue.lines.is_empty() && queue.stopping {
                return;
            }
        }

        // Drain under the file lock so a concurrent rotation can never
        // observe a batch in flight toward the wrong file
        let mut file = shared.file.lock();
        let batch: Vec<String> = shared.queue.lock().lines.drain(..).collect();
        file.write_batch(&batch);
        shared
            .pending_writes
            .fetch_sub(batch.len() as u64, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use types::numeric::{Price, Quantity};
    use types::order::{OrderType, Side};

    fn sample_order(id: &str) -> Order {
        Order {
            order_id: id.into(),
            symbol: "BTC-USDT".into(),
            order_type: OrderType::Limit,
            side: Side::Buy,
            quantity: Quantity::from_minor(500_000),
            price: Price::from_minor(1_000_000),
            timestamp: 1_708_123_456_789_000_000,
        }
    }

    #[test]
    fn test_record_wire_shape() {
        let record = WalRecord {
            timestamp: 42,
            event: WalEvent::Cancel(CancelRecord {
                order_id: "ORD-1".into(),
                reason: "user_request".into(),
            }),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"type\":\"cancel\""));
        assert!(json.contains("\"timestamp\":42"));
        assert!(json.contains("\"payload\":{"));

        let back: WalRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn test_append_and_stop_flushes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("wal.jsonl");
        let wal = Wal::open(&path).unwrap();

        wal.append_order(&sample_order("ORD-1"));
        wal.append_cancel("ORD-1", "user_request");
        assert_eq!(wal.total_entries(), 2);
        wal.stop();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"type\":\"order\""));
        assert!(lines[1].contains("\"type\":\"cancel\""));
        assert_eq!(wal.pending_writes(), 0);
    }

    #[test]
    fn test_append_after_stop_is_dropped() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("wal.jsonl");
        let wal = Wal::open(&path).unwrap();
        wal.stop();
        wal.append_order(&sample_order("ORD-1"));
        wal.stop();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.is_empty());
    }

    #[test]
    fn test_stop_idempotent() {
        let tmp = TempDir::new().unwrap();
        let wal = Wal::open(tmp.path().join("wal.jsonl")).unwrap();
        wal.stop();
        wal.stop();
    }

    #[test]
    fn test_rotate_produces_sibling_and_fresh_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("wal.jsonl");
        let wal = Wal::open(&path).unwrap();

        wal.append_order(&sample_order("ORD-1"));
        let rotated = wal.rotate().unwrap();
        wal.append_order(&sample_order("ORD-2"));
        wal.stop();

        let old = fs::read_to_string(&rotated).unwrap();
        assert!(old.contains("ORD-1"));
        let fresh = fs::read_to_string(&path).unwrap();
        assert!(fresh.contains("ORD-2"));
        assert!(!fresh.contains("ORD-1"));
    }

    #[test]
    fn test_many_appends_all_durable() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("wal.jsonl");
        let wal = Wal::open(&path).unwrap();

        for i in 0..500 {
            wal.append_order(&sample_order(&format!("ORD-{i}")));
        }
        wal.stop();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 500);
    }
}
