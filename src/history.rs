//! # History — Append-Only Analysis Log with JSON Snapshots
//!
//! Keeps every analysis attempt — successful records and error entries alike —
//! in insertion order, and serializes the full log to a JSON snapshot on
//! demand. Snapshots are written atomically (temp file, then rename) so a
//! failed save never leaves a truncated file behind, and each save overwrites
//! the previous snapshot wholesale; there is no merging.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::analyzer::AnalysisRecord;

/// One log entry: a full analysis record, or the error that ended an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistoryEntry {
    Record(AnalysisRecord),
    Failure { error: String },
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("cannot write history snapshot {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot encode history snapshot: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
    #[error("cannot read history snapshot {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("history snapshot {} is not valid JSON: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// In-memory history log; the only writer of the snapshot file.
#[derive(Debug, Default)]
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn record_success(&mut self, record: AnalysisRecord) {
        self.record(HistoryEntry::Record(record));
    }

    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.record(HistoryEntry::Failure {
            error: error.into(),
        });
    }

    /// Entries in insertion order.
    pub fn list(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize the full log to pretty JSON at `path`, overwriting any
    /// existing snapshot. Atomic: written to a temp file and renamed into
    /// place, so failures leave the old snapshot (or nothing) intact.
    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|source| PersistenceError::Encode { source })?;

        let tmp = path.with_extension("tmp");
        let write_err = |source| PersistenceError::Write {
            path: path.to_path_buf(),
            source,
        };
        std::fs::write(&tmp, json.as_bytes()).map_err(write_err)?;
        std::fs::rename(&tmp, path).map_err(write_err)?;
        Ok(())
    }

    /// Load a snapshot produced by [`save`](Self::save).
    pub fn load(path: &Path) -> Result<Vec<HistoryEntry>, PersistenceError> {
        let raw = std::fs::read_to_string(path).map_err(|source| PersistenceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| PersistenceError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }
}
