use thiserror::Error;

use crate::config::ConfigError;
use crate::sink::SinkError;
use crate::source::SourceError;

/// Top-level error for the userfetch binary.
///
/// Only startup-phase failures surface here: loading config or work items,
/// creating the output artifact, reading it back. Fetch failures and
/// timeouts are contained per work item by the orchestrator and never reach
/// this type.
#[derive(Debug, Error)]
pub enum UserFetchError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("work-item source error: {0}")]
    Source(#[from] SourceError),

    #[error("result sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
