//! JSON-based session history.
//!
//! Provides persistent storage for:
//! - Completed and interrupted Work/Break intervals
//! - All-time statistics over those intervals
//!
//! The history file is rewritten in full on every change. It is never rotated
//! or truncated, so it grows for as long as the widget is used.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::write_atomic;
use crate::error::HistoryError;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The two alternating interval kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntervalType {
    Work,
    Break,
}

impl IntervalType {
    pub fn toggled(self) -> Self {
        match self {
            IntervalType::Work => IntervalType::Break,
            IntervalType::Break => IntervalType::Work,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IntervalType::Work => "Work",
            IntervalType::Break => "Break",
        }
    }
}

impl std::fmt::Display for IntervalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logged interval. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Local wall-clock time the interval started.
    #[serde(rename = "date", with = "local_date")]
    pub start_timestamp: NaiveDateTime,
    #[serde(rename = "type")]
    pub interval_type: IntervalType,
    pub duration_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Stats {
    pub total_sessions: u64,
    pub total_work_seconds: u64,
    pub total_break_seconds: u64,
}

/// Append-only store of [`SessionRecord`]s backed by a single JSON array.
#[derive(Debug)]
pub struct SessionLog {
    path: PathBuf,
    records: Vec<SessionRecord>,
}

impl SessionLog {
    /// An empty log bound to `path`. Call [`SessionLog::load_all`] to read it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
        }
    }

    /// Open the log at `path` and read its history.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut log = Self::new(path);
        log.load_all();
        log
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full history into memory.
    ///
    /// A missing file is an empty history. A file that is not a JSON array is
    /// treated as empty and overwritten with an empty array right away.
    /// Individual entries that do not parse are skipped.
    pub fn load_all(&mut self) -> &[SessionRecord] {
        self.records = match std::fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str::<Vec<Value>>(&content) {
                Ok(entries) => self.parse_entries(entries),
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "corrupt history file, starting empty");
                    if let Err(e) = self.persist(&[]) {
                        tracing::warn!("{e}");
                    }
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cannot read history file");
                Vec::new()
            }
        };
        &self.records
    }

    /// Add a record and rewrite the file.
    ///
    /// The record is kept in memory even if the write fails.
    ///
    /// # Errors
    /// Returns an error if the history file cannot be written.
    pub fn append(&mut self, record: SessionRecord) -> Result<(), HistoryError> {
        self.records.push(record);
        self.persist(&self.records)
    }

    /// Drop every record, in memory and on disk.
    ///
    /// # Errors
    /// Returns an error if the history file cannot be written.
    pub fn clear(&mut self) -> Result<(), HistoryError> {
        self.records.clear();
        self.persist(&[])
    }

    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The last `n` records, newest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &SessionRecord> {
        self.records.iter().rev().take(n)
    }

    /// Totals over the in-memory history.
    pub fn aggregate(&self) -> Stats {
        self.records.iter().fold(Stats::default(), |mut stats, r| {
            stats.total_sessions += 1;
            match r.interval_type {
                IntervalType::Work => stats.total_work_seconds += r.duration_seconds,
                IntervalType::Break => stats.total_break_seconds += r.duration_seconds,
            }
            stats
        })
    }

    fn parse_entries(&self, entries: Vec<Value>) -> Vec<SessionRecord> {
        entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), index, error = %e, "skipping history entry");
                    None
                }
            })
            .collect()
    }

    fn persist(&self, records: &[SessionRecord]) -> Result<(), HistoryError> {
        let write_failed = |message: String| HistoryError::WriteFailed {
            path: self.path.clone(),
            message,
        };
        let content =
            serde_json::to_string_pretty(records).map_err(|e| write_failed(e.to_string()))?;
        write_atomic(&self.path, &content).map_err(|e| write_failed(e.to_string()))
    }
}

/// `YYYY-MM-DD HH:MM:SS` without a zone, matching the historic file format.
mod local_date {
    use super::DATE_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&date.format(DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}
