//! Aggregate accounting for one harvest run.

use chrono::{DateTime, Utc};
use serde::Serialize;

use harvester_core::{FailureKind, FetchFailure};

/// Final tallies for a run. `attempted` always equals
/// `succeeded + failed`, and the per-kind counts sum to `failed`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub retries_exhausted: usize,
    pub permanent: usize,
    pub normalization: usize,
    pub cancelled: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl RunSummary {
    /// Tally a finished run from its failure list.
    pub fn new(
        attempted: usize,
        succeeded: usize,
        failures: &[FetchFailure],
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let mut retries_exhausted = 0;
        let mut permanent = 0;
        let mut normalization = 0;
        let mut cancelled = 0;
        for failure in failures {
            match failure.kind {
                FailureKind::RetriesExhausted => retries_exhausted += 1,
                FailureKind::Permanent => permanent += 1,
                FailureKind::Normalization => normalization += 1,
                FailureKind::Cancelled => cancelled += 1,
            }
        }

        let elapsed_ms = finished_at
            .signed_duration_since(started_at)
            .num_milliseconds()
            .max(0) as u64;

        Self {
            attempted,
            succeeded,
            failed: failures.len(),
            retries_exhausted,
            permanent,
            normalization,
            cancelled,
            started_at,
            finished_at,
            elapsed_ms,
        }
    }
}
