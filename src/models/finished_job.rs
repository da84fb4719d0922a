use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::queued_job::JobId;

/// Append-only completion record, written in the same transaction that
/// deletes the matching `queued_jobs` row
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct FinishedJob {
    pub job_id: JobId,
    pub started_time: DateTime<Utc>,
    pub duration_ms: i64,
}

impl FinishedJob {
    /// Build the completion record for a job claimed at `started_time` and
    /// finished at `finished_time`. Clock skew between hosts can put the
    /// claim in the future, so the duration never goes below zero.
    pub fn completed(job_id: JobId, started_time: DateTime<Utc>, finished_time: DateTime<Utc>) -> Self {
        let duration_ms = (finished_time - started_time).num_milliseconds().max(0);
        Self {
            job_id,
            started_time,
            duration_ms,
        }
    }
}
