//! Command-line interface, built on clap.
//!
//! Two subcommands: `run` executes one pipeline round, `results` renders the
//! previously saved artifact. Global flags cover the config path, a retry
//! override and logging behavior.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// userfetch — concurrent user-data fetch pipeline.
#[derive(Debug, Parser)]
#[command(name = "userfetch", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the pipeline configuration file.
    #[arg(long, global = true, default_value = "userfetch.toml")]
    pub config: PathBuf,

    /// Override the configured total attempts per work item.
    #[arg(long, global = true)]
    pub max_attempts: Option<u32>,

    /// Enable verbose output.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable log lines.
    Text,
    /// One JSON object per log event.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch every user in the work-item table and persist the results.
    Run {
        /// Path to the CSV work-item table.
        #[arg(long, default_value = "users.csv")]
        users: PathBuf,
    },

    /// Show previously saved results from the output artifact.
    Results,
}
