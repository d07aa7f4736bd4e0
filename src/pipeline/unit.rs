use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fetch::FetchError;

/// States a work item's processing unit moves through.
///
/// `Pending → Fetching → {Succeeded | TimedOut | Failed}`, with
/// `Fetching → Retrying → Fetching` loops bounded by the attempt cap.
/// Terminal states are never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitState {
    Pending,
    Fetching,
    Retrying,
    Succeeded,
    TimedOut,
    Failed,
}

impl UnitState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UnitState::Succeeded | UnitState::TimedOut | UnitState::Failed
        )
    }
}

impl fmt::Display for UnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitState::Pending => write!(f, "PENDING"),
            UnitState::Fetching => write!(f, "FETCHING"),
            UnitState::Retrying => write!(f, "RETRYING"),
            UnitState::Succeeded => write!(f, "SUCCEEDED"),
            UnitState::TimedOut => write!(f, "TIMED_OUT"),
            UnitState::Failed => write!(f, "FAILED"),
        }
    }
}

/// Retry tuning for transient fetch failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts per work item, first try included.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay in milliseconds for exponential backoff.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay after the given 1-based failed attempt.
    /// delay = base_delay_ms * 2^(attempt - 1)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms * 2u64.pow(attempt.saturating_sub(1)))
    }
}

/// Terminal classification of one settled unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UnitOutcome {
    Succeeded,
    TimedOut,
    Failed(String),
}

/// The result of recording one fetch attempt.
#[derive(Debug)]
pub enum Attempt {
    /// Transient failure with retries remaining: sleep, then try again.
    Retry { delay: Duration, error: FetchError },
    /// The unit reached a terminal fetch result.
    Settled(Result<Value, FetchError>),
}

/// Tracks one work item's walk through the unit state machine.
#[derive(Debug, Clone)]
pub struct Unit {
    pub id: String,
    pub state: UnitState,
    pub history: Vec<UnitState>,
    pub attempts: u32,
    policy: RetryPolicy,
}

impl Unit {
    pub fn new(id: &str, policy: RetryPolicy) -> Self {
        Self {
            id: id.to_string(),
            state: UnitState::Pending,
            history: Vec::new(),
            attempts: 0,
            policy,
        }
    }

    /// Moves the unit out of `Pending` as its first fetch begins.
    pub fn start(&mut self) {
        self.transition(UnitState::Fetching);
    }

    /// Moves a `Retrying` unit back to `Fetching` for the next attempt.
    pub fn resume(&mut self) {
        self.transition(UnitState::Fetching);
    }

    /// Records one fetch attempt and decides what happens next.
    ///
    /// Transient errors retry while attempts remain; the last transient
    /// error and every final error settle the unit.
    pub fn record(&mut self, result: Result<Value, FetchError>) -> Attempt {
        self.attempts += 1;
        match result {
            Ok(payload) => {
                self.transition(UnitState::Succeeded);
                Attempt::Settled(Ok(payload))
            }
            Err(error) if error.is_transient() && self.attempts < self.policy.max_attempts => {
                self.transition(UnitState::Retrying);
                Attempt::Retry {
                    delay: self.policy.delay_for_attempt(self.attempts),
                    error,
                }
            }
            Err(error) => {
                self.transition(UnitState::Failed);
                Attempt::Settled(Err(error))
            }
        }
    }

    /// Marks the unit timed out, unless it already settled.
    pub fn mark_timed_out(&mut self) {
        self.transition(UnitState::TimedOut);
    }

    fn transition(&mut self, next: UnitState) {
        if self.state.is_terminal() {
            return;
        }
        self.history.push(self.state);
        self.state = next;
    }

    /// Consumes the unit into its settled report.
    pub fn into_report(self, outcome: UnitOutcome) -> UnitReport {
        let mut states = self.history;
        states.push(self.state);
        UnitReport {
            id: self.id,
            outcome,
            attempts: self.attempts,
            states,
        }
    }
}

/// Settled record for one work item, used for progress output and tallying.
#[derive(Debug, Clone, Serialize)]
pub struct UnitReport {
    pub id: String,
    pub outcome: UnitOutcome,
    pub attempts: u32,
    pub states: Vec<UnitState>,
}
