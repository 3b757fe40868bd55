//! Append-only audit trail of attempted actions and errors.
//!
//! The sink is best effort: a failed write is reported through `tracing` and
//! never interrupts the engine.

use crate::error::Result;
use crate::{io, paths};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionRecord {
    pub email: String,
    pub account_name: String,
    pub label: String,
    pub timestamp: DateTime<Utc>,
}

impl ActionRecord {
    pub fn now(email: &str, account_name: &str, label: &str) -> Self {
        Self {
            email: email.to_string(),
            account_name: account_name.to_string(),
            label: label.to_string(),
            timestamp: Utc::now(),
        }
    }
}

impl fmt::Display for ActionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}",
            self.email,
            self.account_name,
            self.label,
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub message: String,
}

impl ErrorRecord {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.severity.as_str(),
            self.message
        )
    }
}

// ---------------------------------------------------------------------------
// AuditSink
// ---------------------------------------------------------------------------

pub trait AuditSink {
    fn record_action(&mut self, record: &ActionRecord);

    fn record_error(&mut self, record: &ErrorRecord);

    fn error(&mut self, message: &str) {
        self.record_error(&ErrorRecord::error(message));
    }

    fn warning(&mut self, message: &str) {
        self.record_error(&ErrorRecord::warning(message));
    }
}

/// Writes `actions_<stamp>[_dryrun].log` and `errors_<stamp>.log` under a
/// log directory. Both files are created when the sink is opened.
#[derive(Debug)]
pub struct FileAuditSink {
    actions_path: PathBuf,
    errors_path: PathBuf,
    actions: File,
    errors: File,
}

impl FileAuditSink {
    pub fn open(dir: &Path, stamp: &str, dry_run: bool) -> Result<Self> {
        io::ensure_dir(dir)?;
        let actions_path = paths::actions_log_path(dir, stamp, dry_run);
        let errors_path = paths::errors_log_path(dir, stamp);
        let actions = io::open_append(&actions_path)?;
        let errors = io::open_append(&errors_path)?;
        Ok(Self {
            actions_path,
            errors_path,
            actions,
            errors,
        })
    }

    pub fn actions_path(&self) -> &Path {
        &self.actions_path
    }

    pub fn errors_path(&self) -> &Path {
        &self.errors_path
    }
}

impl AuditSink for FileAuditSink {
    fn record_action(&mut self, record: &ActionRecord) {
        if let Err(e) = io::append_line(&mut self.actions, &record.to_string()) {
            tracing::warn!(path = %self.actions_path.display(), "failed to write action record: {e}");
        }
    }

    fn record_error(&mut self, record: &ErrorRecord) {
        if let Err(e) = io::append_line(&mut self.errors, &record.to_string()) {
            tracing::warn!(path = %self.errors_path.display(), "failed to write error record: {e}");
        }
    }
}

/// Keeps every record in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryAuditSink {
    pub actions: Vec<ActionRecord>,
    pub errors: Vec<ErrorRecord>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.label.as_str()).collect()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.message.as_str()).collect()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record_action(&mut self, record: &ActionRecord) {
        self.actions.push(record.clone());
    }

    fn record_error(&mut self, record: &ErrorRecord) {
        self.errors.push(record.clone());
    }
}
