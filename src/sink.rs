//! Durable JSONL result sink.
//!
//! The output artifact is truncated exactly once when the sink is created
//! and appended to for the rest of the run. Appends from concurrent units
//! are serialized behind a mutex so one call always lands as one complete
//! line; interleaving can never split a record.

use std::path::Path;

use serde_json::Value;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("record is not serializable: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Append-only writer for the run's JSONL artifact.
pub struct ResultSink {
    writer: Mutex<File>,
}

impl ResultSink {
    /// Creates (truncating) the artifact at `path`. Called once per run.
    pub async fn create(path: &Path) -> Result<Self, SinkError> {
        let file = File::create(path).await?;
        Ok(Self {
            writer: Mutex::new(file),
        })
    }

    /// Appends one record as a single JSON line.
    ///
    /// The serialized bytes and terminator are written in one guarded write,
    /// so the call either lands a full line or nothing.
    pub async fn append(&self, record: &Value) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await?;
        Ok(())
    }
}

/// Reads back a JSONL artifact, skipping unparseable lines with a warning.
pub fn read_results(path: &Path) -> std::io::Result<Vec<Value>> {
    let contents = std::fs::read_to_string(path)?;
    let mut records = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(record) => records.push(record),
            Err(error) => warn!(%line, %error, "skipping invalid result line"),
        }
    }
    Ok(records)
}
