//! Deterministic replay reader
//!
//! Reads the event log back in append order. Lines that fail to parse
//! (a torn tail after a crash, stray corruption) are counted and
//! skipped; they never abort startup. A missing file is an empty log.

use crate::wal::{WalError, WalRecord};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{info, warn};

/// Result of replaying a log file.
#[derive(Debug, Default)]
pub struct Replay {
    /// Records in original append order.
    pub records: Vec<WalRecord>,
    /// Lines skipped as unparseable.
    pub skipped: usize,
}

/// Read the full ordered event sequence from `path`.
pub fn replay(path: impl AsRef<Path>) -> Result<Replay, WalError> {
    let path = path.as_ref();
    if !path.exists() {
        info!(path = %path.display(), "no WAL file; starting from empty state");
        return Ok(Replay::default());
    }

    let file = File::open(path)?;
    let mut out = Replay::default();

    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<WalRecord>(&line) {
            Ok(record) => out.records.push(record),
            Err(e) => {
                warn!(line = idx + 1, error = %e, "skipping corrupt WAL line");
                out.skipped += 1;
            }
        }
    }

    info!(
        path = %path.display(),
        records = out.records.len(),
        skipped = out.skipped,
        "WAL replay complete"
    );
    Ok(out)
}
