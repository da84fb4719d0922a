use chrono::{DateTime, Utc};
use rand::Rng;
use sqlx::FromRow;
use uuid::Uuid;

pub type JobId = String;

/// A job waiting in, or claimed from, the `queued_jobs` table
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct QueuedJob {
    pub job_id: JobId,
    pub created_time: DateTime<Utc>,
    /// `None` while unclaimed. Set once, by the claim.
    pub started_time: Option<DateTime<Utc>>,
    pub difficulty: i64,
}

impl QueuedJob {
    /// Create a new unclaimed job
    pub fn new(difficulty: i64) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            created_time: Utc::now(),
            started_time: None,
            difficulty,
        }
    }

    /// Create a job with a random difficulty in `[0, max_difficulty)`
    pub fn random(max_difficulty: i64) -> Self {
        let difficulty = if max_difficulty > 0 {
            rand::rng().random_range(0..max_difficulty)
        } else {
            0
        };
        Self::new(difficulty)
    }

    pub fn with_created_time(mut self, created_time: DateTime<Utc>) -> Self {
        self.created_time = created_time;
        self
    }
}
