//! Append-only audit trail of agent actions.
//!
//! Every operation the agent performs on an identity system is recorded as
//! one [`ActionRecord`]. Records are never mutated or deleted; their only
//! identity is the order in which they were written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// One audited operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub target: String,
    /// Result status exactly as reported by the caller
    pub status: String,
    #[serde(default)]
    pub details: Map<String, Value>,
}

impl ActionRecord {
    pub fn new(
        action: impl Into<String>,
        target: impl Into<String>,
        status: impl Into<String>,
        details: Map<String, Value>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            action: action.into(),
            target: target.into(),
            status: status.into(),
            details,
        }
    }

    /// Human-readable audit line:
    /// `[AUDIT] <action> on <target>: <status> <details-json>`.
    pub fn audit_line(&self) -> String {
        let details = Value::Object(self.details.clone());
        format!(
            "[AUDIT] {} on {}: {} {}",
            self.action, self.target, self.status, details
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit sink I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize action record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("audit sink lock poisoned")]
    Poisoned,
}

/// Destination for action records.
pub trait AuditSink: Send + Sync {
    fn append(&self, record: &ActionRecord) -> Result<(), AuditError>;
}

/// Writes one audit line per record to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl AuditSink for StdoutSink {
    fn append(&self, record: &ActionRecord) -> Result<(), AuditError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", record.audit_line())?;
        Ok(())
    }
}

/// Appends records to a file, one JSON object per line.
#[derive(Debug)]
pub struct JsonLinesSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonLinesSink {
    /// Open (or create) the file in append mode.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for JsonLinesSink {
    fn append(&self, record: &ActionRecord) -> Result<(), AuditError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = self.file.lock().map_err(|_| AuditError::Poisoned)?;
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

/// Keeps records in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<ActionRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record written so far, in insertion order.
    pub fn records(&self) -> Vec<ActionRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemorySink {
    fn append(&self, record: &ActionRecord) -> Result<(), AuditError> {
        self.records
            .lock()
            .map_err(|_| AuditError::Poisoned)?
            .push(record.clone());
        Ok(())
    }
}

/// Records actions to an [`AuditSink`].
///
/// Logging never fails from the caller's point of view: a sink error is
/// reported with `tracing::warn!` and the record is still returned.
#[derive(Clone)]
pub struct ActionLogger {
    sink: Arc<dyn AuditSink>,
}

impl ActionLogger {
    pub fn new(sink: impl AuditSink + 'static) -> Self {
        Self {
            sink: Arc::new(sink),
        }
    }

    pub fn from_arc(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    /// Logger writing to standard output.
    pub fn stdout() -> Self {
        Self::new(StdoutSink)
    }

    /// Record one action. Exactly one record is appended per call.
    pub fn log_action(
        &self,
        action: &str,
        target: &str,
        status: &str,
        details: Map<String, Value>,
    ) -> ActionRecord {
        let record = ActionRecord::new(action, target, status, details);

        tracing::info!(
            action = %record.action,
            target = %record.target,
            status = %record.status,
            "Action logged"
        );

        if let Err(e) = self.sink.append(&record) {
            tracing::warn!(error = %e, action = %record.action, "Failed to write audit record");
        }

        record
    }
}

impl std::fmt::Debug for ActionLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionLogger").finish_non_exhaustive()
    }
}
