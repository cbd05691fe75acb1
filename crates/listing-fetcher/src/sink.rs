//! Failure sinks: where "no result" outcomes get recorded.
//!
//! - [`TracingSink`]: structured `error!` events (the default)
//! - [`JsonlSink`]: append-only JSONL file, one line per failed attempt
//! - [`MemorySink`]: in-memory list, for callers that want to inspect failures
//! - [`FanoutSink`]: forwards to several sinks
//!
//! Recording never fails from the caller's point of view. A sink that
//! cannot write says so through `tracing` and moves on.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::types::FailureRecord;

/// Receives one record per failed fetch attempt.
pub trait FailureSink: Send + Sync {
    fn record(&self, record: &FailureRecord);
}

/// Logs failures as `tracing` error events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl FailureSink for TracingSink {
    fn record(&self, record: &FailureRecord) {
        tracing::error!(
            url = %record.url,
            status = ?record.status,
            kind = %record.kind,
            "failed to fetch listing page: {}",
            record.message
        );
    }
}

/// Keeps every record in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<FailureRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn records(&self) -> Vec<FailureRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FailureSink for MemorySink {
    fn record(&self, record: &FailureRecord) {
        let mut records = self
            .records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        records.push(record.clone());
    }
}

/// Append-only JSONL failure log.
pub struct JsonlSink {
    file: Mutex<File>,
    path: PathBuf,
}

impl JsonlSink {
    /// Open or create the log, creating parent directories as needed.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            file: Mutex::new(file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FailureSink for JsonlSink {
    fn record(&self, record: &FailureRecord) {
        let line = match serde_json::to_string(record) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "cannot encode failure record: {e}");
                return;
            }
        };
        let mut file = self
            .file
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Err(e) = writeln!(file, "{line}").and_then(|()| file.flush()) {
            tracing::warn!(path = %self.path.display(), "cannot write failure log: {e}");
        }
    }
}

/// Forwards each record to every inner sink, in order.
#[derive(Default, Clone)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn FailureSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn FailureSink>>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: Arc<dyn FailureSink>) {
        self.sinks.push(sink);
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl FailureSink for FanoutSink {
    fn record(&self, record: &FailureRecord) {
        for sink in &self.sinks {
            sink.record(record);
        }
    }
}
