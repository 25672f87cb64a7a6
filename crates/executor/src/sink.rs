//! Streaming result sinks.
//!
//! A sink receives one KPI row per finished replica, append-only, in
//! whatever order replicas complete. Rows are self-describing, so readers
//! sort by replica index after the fact. [`JsonlSink`] additionally
//! survives process crashes: every row is flushed on append, and a
//! truncated trailing line from a crash is ignored on reload, which is what
//! makes experiments resume-safe.

use crate::error::PersistenceError;
use lpgsim_types::{KpiRow, SeriesRow};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Destination for streamed replica results.
pub trait ResultSink: Send + Sync {
    /// Append one KPI row.
    fn append_row(&self, row: &KpiRow) -> Result<(), PersistenceError>;

    /// Append one full time series (sampled replicas only).
    fn append_series(&self, series: &SeriesRow) -> Result<(), PersistenceError>;
}

// ═══════════════════════════════════════════════════════════════════════
// In-memory sink
// ═══════════════════════════════════════════════════════════════════════

/// Sink that collects rows in memory; used by tests and by callers that
/// aggregate immediately without persistence.
#[derive(Debug, Default)]
pub struct MemorySink {
    rows: Mutex<Vec<KpiRow>>,
    series: Mutex<Vec<SeriesRow>>,
}

impl MemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows appended so far, in completion order.
    pub fn rows(&self) -> Vec<KpiRow> {
        self.rows.lock().clone()
    }

    /// Series appended so far, in completion order.
    pub fn series(&self) -> Vec<SeriesRow> {
        self.series.lock().clone()
    }
}

impl ResultSink for MemorySink {
    fn append_row(&self, row: &KpiRow) -> Result<(), PersistenceError> {
        self.rows.lock().push(row.clone());
        Ok(())
    }

    fn append_series(&self, series: &SeriesRow) -> Result<(), PersistenceError> {
        self.series.lock().push(series.clone());
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// JSONL sink
// ═══════════════════════════════════════════════════════════════════════

/// File name of the KPI row stream inside a sink directory.
pub const KPI_FILE: &str = "kpis.jsonl";
/// File name of the sampled time-series stream inside a sink directory.
pub const SERIES_FILE: &str = "series.jsonl";

/// Append-only JSONL sink: one `KpiRow` per line in `kpis.jsonl`, one
/// `SeriesRow` per line in `series.jsonl`.
pub struct JsonlSink {
    rows: Mutex<BufWriter<File>>,
    series: Mutex<BufWriter<File>>,
    dir: PathBuf,
}

impl JsonlSink {
    /// Open (creating or appending to) a sink directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        let open = |name: &str| -> Result<BufWriter<File>, PersistenceError> {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join(name))?;
            Ok(BufWriter::new(file))
        };
        Ok(Self {
            rows: Mutex::new(open(KPI_FILE)?),
            series: Mutex::new(open(SERIES_FILE)?),
            dir,
        })
    }

    /// Directory this sink writes into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Replica indices already present in the KPI stream of `dir`.
    ///
    /// A truncated trailing line (from a crash mid-append) stops the scan;
    /// every fully written row before it remains valid.
    pub fn completed_indices(dir: impl AsRef<Path>) -> Result<HashSet<u64>, PersistenceError> {
        let path = dir.as_ref().join(KPI_FILE);
        let mut indices = HashSet::new();
        if !path.exists() {
            return Ok(indices);
        }
        let reader = BufReader::new(File::open(path)?);
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<KpiRow>(&line) {
                Ok(row) => {
                    indices.insert(row.replica_index);
                }
                Err(_) => break, // torn tail from a crash
            }
        }
        Ok(indices)
    }

    /// Load every valid KPI row from `dir`, sorted by replica index.
    pub fn load_rows(dir: impl AsRef<Path>) -> Result<Vec<KpiRow>, PersistenceError> {
        let path = dir.as_ref().join(KPI_FILE);
        let mut rows = Vec::new();
        if !path.exists() {
            return Ok(rows);
        }
        let reader = BufReader::new(File::open(path)?);
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<KpiRow>(&line) {
                Ok(row) => rows.push(row),
                Err(_) => break,
            }
        }
        rows.sort_by_key(|r| (r.scenario_id, r.replica_index));
        Ok(rows)
    }

    /// Load every valid series row from `dir`, sorted by replica index.
    pub fn load_series(dir: impl AsRef<Path>) -> Result<Vec<SeriesRow>, PersistenceError> {
        let path = dir.as_ref().join(SERIES_FILE);
        let mut series = Vec::new();
        if !path.exists() {
            return Ok(series);
        }
        let reader = BufReader::new(File::open(path)?);
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<SeriesRow>(&line) {
                Ok(row) => series.push(row),
                Err(_) => break,
            }
        }
        series.sort_by_key(|r| (r.scenario_id, r.replica_index));
        Ok(series)
    }

    fn append_line<T: serde::Serialize>(
        writer: &Mutex<BufWriter<File>>,
        value: &T,
    ) -> Result<(), PersistenceError> {
        let mut line = serde_json::to_vec(value)?;
        line.push(b'\n');
        let mut guard = writer.lock();
        guard.write_all(&line)?;
        guard.flush()?;
        Ok(())
    }
}

impl ResultSink for JsonlSink {
    fn append_row(&self, row: &KpiRow) -> Result<(), PersistenceError> {
        Self::append_line(&self.rows, row)
    }

    fn append_series(&self, series: &SeriesRow) -> Result<(), PersistenceError> {
        Self::append_line(&self.series, series)
    }
}
