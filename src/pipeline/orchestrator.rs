use std::time::Duration;

use futures::future::join_all;
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::time::{sleep, timeout};
use tracing::{error, info, warn};

use crate::config::PipelineConfig;
use crate::fetch::{FetchError, UserFetcher};
use crate::sink::ResultSink;
use crate::source::WorkItem;
use crate::ui::RunProgress;

use super::summary::RunSummary;
use super::unit::{Attempt, RetryPolicy, Unit, UnitOutcome, UnitReport};

/// Drives one fan-out/fan-in round over the work items.
///
/// Every item gets its own unit of work: fetch with retries, bounded by the
/// per-task deadline, successful payloads appended to the sink. Units run
/// concurrently and settle independently; a failure or timeout in one never
/// cancels the others. Returns only after every unit has settled.
pub async fn run_pipeline<F>(
    config: &PipelineConfig,
    fetcher: &F,
    items: &[WorkItem],
    sink: &ResultSink,
    progress: &RunProgress,
) -> RunSummary
where
    F: UserFetcher + Sync,
{
    info!(count = items.len(), "starting user fetch tasks");

    let semaphore = config.concurrency.map(Semaphore::new);
    let deadline = config.timeout();

    let units = items.iter().map(|item| {
        let semaphore = semaphore.as_ref();
        async move {
            let _permit = match semaphore {
                Some(s) => Some(s.acquire().await.expect("semaphore closed")),
                None => None,
            };
            let report = run_unit(fetcher, &config.retry, deadline, sink, item).await;
            progress.unit_settled(&report);
            report
        }
    });

    let reports = join_all(units).await;

    let mut summary = RunSummary::default();
    for report in &reports {
        summary.record(&report.outcome);
    }
    info!(
        total = summary.total,
        succeeded = summary.succeeded,
        timed_out = summary.timed_out,
        failed = summary.failed,
        "all units settled"
    );
    summary
}

/// Runs a single work item to a settled report.
async fn run_unit<F>(
    fetcher: &F,
    policy: &RetryPolicy,
    deadline: Duration,
    sink: &ResultSink,
    item: &WorkItem,
) -> UnitReport
where
    F: UserFetcher + Sync,
{
    let mut unit = Unit::new(&item.id, policy.clone());
    unit.start();

    let fetched = timeout(deadline, drive_fetch(fetcher, &mut unit)).await;
    match fetched {
        Ok(Ok(payload)) => {
            let name = payload
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            if let Err(sink_error) = sink.append(&payload).await {
                // The fetched payload is lost here; the unit still counts as
                // succeeded because the fetch itself did.
                error!(user_id = %unit.id, error = %sink_error, "failed to persist result");
            } else {
                info!(
                    user_id = %unit.id,
                    name = %name,
                    attempts = unit.attempts,
                    "fetched and saved user"
                );
            }
            unit.into_report(UnitOutcome::Succeeded)
        }
        Ok(Err(fetch_error)) => {
            warn!(
                user_id = %unit.id,
                error = %fetch_error,
                attempts = unit.attempts,
                "failed to fetch user"
            );
            let message = fetch_error.to_string();
            unit.into_report(UnitOutcome::Failed(message))
        }
        Err(_) => {
            unit.mark_timed_out();
            warn!(user_id = %unit.id, "task timed out");
            unit.into_report(UnitOutcome::TimedOut)
        }
    }
}

/// Fetch loop for one unit: try, and on transient failure sleep out the
/// backoff and try again until the policy's attempt cap settles it.
async fn drive_fetch<F>(fetcher: &F, unit: &mut Unit) -> Result<Value, FetchError>
where
    F: UserFetcher + Sync,
{
    loop {
        let result = fetcher.fetch_user(&unit.id).await;
        match unit.record(result) {
            Attempt::Settled(settled) => return settled,
            Attempt::Retry { delay, error } => {
                warn!(
                    user_id = %unit.id,
                    attempt = unit.attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "transient fetch failure, retrying"
                );
                sleep(delay).await;
                unit.resume();
            }
        }
    }
}
