use async_trait::async_trait;

use super::{BackendKind, JobQueue};
use crate::error::QueueResult;
use crate::models::{FinishedJob, QueuedJob};
use crate::store::JobStore;

/// Single-store backend. Postgres row locks are the only coordination.
///
/// Among rows not being claimed at the same instant, the oldest
/// `created_time` is claimed first. A row locked by an in-flight claim is
/// skipped, so under contention a newer row can win.
#[derive(Debug, Clone)]
pub struct PostgresQueue {
    store: JobStore,
}

impl PostgresQueue {
    pub fn new(store: JobStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl JobQueue for PostgresQueue {
    async fn insert(&self, job: &QueuedJob) -> QueueResult<()> {
        self.store.insert_job(job).await?;
        tracing::debug!("Inserted job {} (difficulty {})", job.job_id, job.difficulty);
        Ok(())
    }

    async fn fetch_tentatively(&self) -> QueueResult<Option<QueuedJob>> {
        let claimed = self.store.claim_oldest().await?;
        if let Some(job) = &claimed {
            tracing::debug!("Claimed job {}", job.job_id);
        }
        Ok(claimed)
    }

    async fn remove(&self, job_id: &str) -> QueueResult<FinishedJob> {
        let finished = self.store.complete_job(job_id).await?;
        tracing::debug!("Job {} finished in {} ms", job_id, finished.duration_ms);
        Ok(finished)
    }

    async fn size(&self) -> QueueResult<i64> {
        self.store.count_queued().await
    }

    fn backend(&self) -> BackendKind {
        BackendKind::Postgres
    }
}
