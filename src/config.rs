//! Pipeline configuration loaded from a TOML document.
//!
//! [`PipelineConfig`] carries the three required run parameters (API base
//! URL, per-task timeout, output path) plus optional retry and concurrency
//! tuning. The required fields have no defaults: a document that omits one
//! fails to load rather than running with a silent zero.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::pipeline::RetryPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("timeout_per_task must be positive, got {seconds}")]
    InvalidTimeout { seconds: f64 },
}

/// Top-level configuration for one pipeline run.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Base URL of the remote user endpoint; ids are appended as path segments.
    pub api_base_url: String,

    /// Deadline in seconds applied to each work item's fetch (retries included).
    pub timeout_per_task: f64,

    /// Destination of the JSONL result artifact. Truncated at run start.
    pub output_path: PathBuf,

    /// Optional cap on concurrently in-flight work items.
    /// Absent means uncapped fan-out, one in-flight unit per work item.
    #[serde(default)]
    pub concurrency: Option<usize>,

    /// Retry tuning for transient fetch failures.
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl PipelineConfig {
    /// Loads and validates the configuration at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path)?;
        let config: PipelineConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_per_task <= 0.0 {
            return Err(ConfigError::InvalidTimeout {
                seconds: self.timeout_per_task,
            });
        }
        Ok(())
    }

    /// Per-task deadline as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_per_task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FULL: &str = r#"
        api_base_url = "https://api.example.test/users"
        timeout_per_task = 5.0
        output_path = "out.jsonl"
        concurrency = 8

        [retry]
        max_attempts = 5
        base_delay_ms = 250
    "#;

    #[test]
    fn deserialize_full_document() {
        let config: PipelineConfig = toml::from_str(FULL).unwrap();
        assert_eq!(config.api_base_url, "https://api.example.test/users");
        assert_eq!(config.timeout_per_task, 5.0);
        assert_eq!(config.output_path, PathBuf::from("out.jsonl"));
        assert_eq!(config.concurrency, Some(8));
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay_ms, 250);
    }

    #[test]
    fn retry_and_concurrency_default_when_absent() {
        let config: PipelineConfig = toml::from_str(
            r#"
            api_base_url = "https://api.example.test"
            timeout_per_task = 2.5
            output_path = "results.jsonl"
            "#,
        )
        .unwrap();
        assert_eq!(config.concurrency, None);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay_ms, 1000);
    }

    #[test]
    fn missing_required_field_is_an_error() {
        // No timeout_per_task — must not default to zero.
        let result = toml::from_str::<PipelineConfig>(
            r#"
            api_base_url = "https://api.example.test"
            output_path = "out.jsonl"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn integer_timeout_is_accepted() {
        let config: PipelineConfig = toml::from_str(
            r#"
            api_base_url = "https://api.example.test"
            timeout_per_task = 5
            output_path = "out.jsonl"
            "#,
        )
        .unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn load_rejects_missing_file() {
        let err = PipelineConfig::load(Path::new("/nonexistent/userfetch.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn load_rejects_zero_timeout() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            api_base_url = "https://api.example.test"
            timeout_per_task = 0
            output_path = "out.jsonl"
            "#
        )
        .unwrap();
        let err = PipelineConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout { seconds } if seconds == 0.0));
    }

    #[test]
    fn load_rejects_malformed_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "api_base_url = [not toml").unwrap();
        let err = PipelineConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_roundtrip_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{FULL}").unwrap();
        let config = PipelineConfig::load(file.path()).unwrap();
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }
}
