mod cli;
mod config;
mod error;
mod fetch;
mod pipeline;
mod sink;
mod source;
mod ui;

use std::path::Path;

use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, LogFormat};
use config::PipelineConfig;
use error::UserFetchError;
use fetch::ApiClient;
use pipeline::{RunRecord, run_pipeline};
use sink::ResultSink;
use ui::RunProgress;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    match &cli.command {
        Command::Run { users } => run(&cli, users).await?,
        Command::Results => results(&cli)?,
    }
    Ok(())
}

/// Initialize tracing from the CLI flags. `RUST_LOG` takes precedence.
fn init_tracing(cli: &Cli) {
    let filter = if cli.verbose {
        "userfetch=debug"
    } else {
        "userfetch=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

/// One pipeline round: load, fan out, persist, summarize.
///
/// Per-unit failures and timeouts are reported in the summary, not here;
/// only startup failures (config, work items, sink creation) are errors.
async fn run(cli: &Cli, users: &Path) -> Result<(), UserFetchError> {
    let started_at = Utc::now();

    let mut config = PipelineConfig::load(&cli.config)?;
    if let Some(max_attempts) = cli.max_attempts {
        config.retry.max_attempts = max_attempts;
    }

    let items = source::load_work_items(users)?;
    let sink = ResultSink::create(&config.output_path).await?;
    let client = ApiClient::new(&config.api_base_url);

    let progress = RunProgress::start(items.len() as u64);
    let summary = run_pipeline(&config, &client, &items, &sink, &progress).await;

    let record = RunRecord::from_summary(&summary, started_at);
    record.emit();
    progress.complete(&record);

    Ok(())
}

/// Render the saved artifact as a table.
fn results(cli: &Cli) -> Result<(), UserFetchError> {
    let config = PipelineConfig::load(&cli.config)?;

    if !config.output_path.exists() {
        println!(
            "{} not found. Run `userfetch run` first.",
            config.output_path.display()
        );
        return Ok(());
    }

    let records = sink::read_results(&config.output_path)?;
    if records.is_empty() {
        println!("{} holds no results yet.", config.output_path.display());
    } else {
        ui::print_results_table(&records);
    }
    Ok(())
}
