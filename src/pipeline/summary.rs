use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::unit::UnitOutcome;

/// Tally of settled units, built incrementally as results arrive.
///
/// Once every launched unit has settled, `succeeded + timed_out + failed`
/// equals `total`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub timed_out: usize,
    pub failed: usize,
}

impl RunSummary {
    /// Counts one settled unit.
    pub fn record(&mut self, outcome: &UnitOutcome) {
        self.total += 1;
        match outcome {
            UnitOutcome::Succeeded => self.succeeded += 1,
            UnitOutcome::TimedOut => self.timed_out += 1,
            UnitOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// Every counted unit is accounted for by exactly one outcome bucket.
    pub fn is_reconciled(&self) -> bool {
        self.succeeded + self.timed_out + self.failed == self.total
    }
}

/// Structured completion record emitted once at run end.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub run_id: String,
    pub total: usize,
    pub succeeded: usize,
    pub timed_out: usize,
    pub failed: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl RunRecord {
    pub fn from_summary(summary: &RunSummary, started_at: DateTime<Utc>) -> Self {
        let completed_at = Utc::now();
        Self {
            run_id: Uuid::new_v4().to_string(),
            total: summary.total,
            succeeded: summary.succeeded,
            timed_out: summary.timed_out,
            failed: summary.failed,
            started_at,
            completed_at,
            duration_ms: (completed_at - started_at).num_milliseconds(),
        }
    }

    /// Emits the completion record as one structured log event.
    pub fn emit(&self) {
        info!(
            run_id = %self.run_id,
            total = self.total,
            succeeded = self.succeeded,
            timed_out = self.timed_out,
            failed = self.failed,
            duration_ms = self.duration_ms,
            "run completed"
        );
    }
}
