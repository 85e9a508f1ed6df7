//! Fetch activity log, one JSON line per outbound platform request.
//!
//! Log file: `~/.domo-viewer/fetch-log.jsonl`
//!
//! Records which endpoint was called, for which instance, how it ended and
//! how long it took. The developer token is never written. Logging is
//! best-effort: I/O failures are ignored so they can never break a session.

use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config;

// ---------------------------------------------------------------------------
// Log entry
// ---------------------------------------------------------------------------

/// A single line of the fetch log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchLogEntry {
    pub timestamp: String,
    /// `"dashboards"`, `"cards"`, `"datasets"` or `"dataflows"`.
    pub resource: String,
    pub instance: String,
    /// Page id for card fetches.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub page_id: Option<String>,
    /// `"ok"`, `"unexpected_shape"`, `"http_error"`, `"transport_error"`,
    /// `"decode_error"` or `"rejected"`.
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub status: Option<u16>,
    /// Records found after normalization (only when the server answered 2xx).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub records: Option<usize>,
    pub latency_ms: u64,
}

impl FetchLogEntry {
    pub fn new(resource: &str, instance: &str, outcome: &str, latency_ms: u64) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            resource: resource.to_string(),
            instance: instance.to_string(),
            page_id: None,
            outcome: outcome.to_string(),
            status: None,
            records: None,
            latency_ms,
        }
    }
}

// ---------------------------------------------------------------------------
// Log file
// ---------------------------------------------------------------------------

/// Append-only JSONL sink.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    path: PathBuf,
}

impl ActivityLog {
    /// The default log under `~/.domo-viewer/`, if a home directory exists.
    pub fn default_location() -> Option<Self> {
        default_log_path().map(Self::at)
    }

    /// The log the config asks for: `None` when logging is disabled.
    pub fn from_config(config: &config::schema::LoggingConfig) -> Option<Self> {
        if config.enabled {
            Self::default_location()
        } else {
            None
        }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry, ignoring failures.
    pub fn record(&self, entry: &FetchLogEntry) {
        let _ = self.append(entry);
    }

    fn append(&self, entry: &FetchLogEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let json = serde_json::to_string(entry)?;
        writeln!(file, "{json}")?;

        Ok(())
    }

    /// Read every entry. Malformed lines are skipped; a missing file reads
    /// as empty.
    pub fn read_all(&self) -> Vec<FetchLogEntry> {
        let Ok(file) = fs::File::open(&self.path) else {
            return Vec::new();
        };

        BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .filter_map(|line| serde_json::from_str::<FetchLogEntry>(&line).ok())
            .collect()
    }

    /// The most recent `n` entries, oldest first.
    pub fn read_recent(&self, n: usize) -> Vec<FetchLogEntry> {
        let mut entries = self.read_all();
        let skip = entries.len().saturating_sub(n);
        entries.drain(..skip);
        entries
    }
}

fn default_log_path() -> Option<PathBuf> {
    config::data_dir().map(|dir| dir.join("fetch-log.jsonl"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
