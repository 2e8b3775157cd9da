//! JSONL evidence log.
//!
//! Each check outcome can be mirrored as one [`LogEntry`] line, written
//! through a [`LogEmitter`] to a file or stdout. Lines are independent
//! JSON objects so downstream tooling can stream them.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::outcome::{CheckOutcome, CheckStatus};

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// One JSONL record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Seconds since the epoch at emission time.
    pub timestamp: u64,
    pub level: LogLevel,
    /// Capability family the line belongs to.
    pub check: String,
    pub operation: String,
    pub outcome: String,
    pub observed: String,
}

impl LogEntry {
    /// Mirror a check outcome: failures log at `Error`, skips at `Warn`.
    #[must_use]
    pub fn from_outcome(outcome: &CheckOutcome) -> Self {
        let level = match outcome.status {
            CheckStatus::Pass => LogLevel::Info,
            CheckStatus::Skip => LogLevel::Warn,
            CheckStatus::Fail => LogLevel::Error,
        };
        Self {
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
            level,
            check: outcome.check.clone(),
            operation: outcome.operation.clone(),
            outcome: outcome.status.as_str().to_string(),
            observed: outcome.observed.clone(),
        }
    }
}

/// Writes JSONL lines to a sink.
pub struct LogEmitter {
    writer: Box<dyn Write>,
}

impl LogEmitter {
    /// Emit to a file at `path`, truncating any previous log.
    pub fn to_file(path: &Path) -> std::io::Result<Self> {
        Ok(Self {
            writer: Box::new(std::fs::File::create(path)?),
        })
    }

    /// Emit to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self {
            writer: Box::new(std::io::stdout()),
        }
    }

    /// Write one entry as a JSON line.
    pub fn emit(&mut self, entry: &LogEntry) -> std::io::Result<()> {
        let line = serde_json::to_string(entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(self.writer, "{line}")
    }
}

/// Parse and validate one JSONL line.
pub fn validate_log_line(line: &str) -> Result<LogEntry, serde_json::Error> {
    serde_json::from_str(line)
}
