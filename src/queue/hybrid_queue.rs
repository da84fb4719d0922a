use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use super::{BackendKind, JobQueue};
use crate::error::{QueueError, QueueResult};
use crate::models::{FinishedJob, QueuedJob};
use crate::store::{JobStore, OrderingIndex};

/// Snapshot of the divergence counters of a [`HybridQueue`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriftStats {
    /// Index pops whose claim matched no unclaimed row
    pub stranded_tokens: u64,
    /// Inserts rolled back because the index push failed
    pub compensated_inserts: u64,
    /// Inserts whose push failed and whose rollback failed too
    pub orphaned_rows: u64,
}

#[derive(Debug, Default)]
struct DriftCounters {
    stranded_tokens: AtomicU64,
    compensated_inserts: AtomicU64,
    orphaned_rows: AtomicU64,
}

/// Redis ordering index in front of the Postgres job store.
///
/// Postgres stays the record of truth: a popped id is only a hint about
/// which row to claim. The two stores are written without a shared
/// transaction, so they can drift:
///
/// - A popped id is never pushed back. If the claim then matches nothing
///   (row deleted, already claimed, or the claim fails) the token is gone,
///   and an unclaimed row it pointed to can no longer be reached through
///   the index. Such rows still count in [`JobQueue::size`].
/// - An insert commits the row first and pushes the id second. A failed push
///   is compensated by deleting the row; if that delete fails as well the
///   row is orphaned.
///
/// Both cases are logged and counted in [`DriftStats`]. Nothing here tries to
/// reconcile the stores.
#[derive(Debug, Clone)]
pub struct HybridQueue {
    store: JobStore,
    index: OrderingIndex,
    counters: Arc<DriftCounters>,
}

impl HybridQueue {
    pub fn new(store: JobStore, index: OrderingIndex) -> Self {
        Self {
            store,
            index,
            counters: Arc::new(DriftCounters::default()),
        }
    }

    pub fn drift_stats(&self) -> DriftStats {
        DriftStats {
            stranded_tokens: self.counters.stranded_tokens.load(Ordering::Relaxed),
            compensated_inserts: self.counters.compensated_inserts.load(Ordering::Relaxed),
            orphaned_rows: self.counters.orphaned_rows.load(Ordering::Relaxed),
        }
    }

    /// Undo a committed insert whose index push failed
    async fn compensate_insert(&self, job_id: &str) {
        match self.store.delete_job(job_id).await {
            Ok(deleted) => {
                self.counters.compensated_inserts.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    job_id = %job_id,
                    deleted,
                    "Index push failed, queued job row rolled back"
                );
            }
            Err(e) => {
                self.counters.orphaned_rows.fetch_add(1, Ordering::Relaxed);
                tracing::error!(
                    job_id = %job_id,
                    error = %e,
                    "Index push failed and the queued job row could not be deleted; it is unreachable through the index"
                );
            }
        }
    }
}

#[async_trait]
impl JobQueue for HybridQueue {
    async fn insert(&self, job: &QueuedJob) -> QueueResult<()> {
        self.store.insert_job(job).await?;

        if let Err(push_error) = self.index.push(&job.job_id).await {
            self.compensate_insert(&job.job_id).await;
            return Err(QueueError::InsertError(format!(
                "Queued job {} was not indexed: {}",
                job.job_id, push_error
            )));
        }

        tracing::debug!("Inserted and indexed job {} (difficulty {})", job.job_id, job.difficulty);
        Ok(())
    }

    async fn fetch_tentatively(&self) -> QueueResult<Option<QueuedJob>> {
        let job_id = self
            .index
            .pop()
            .await
            .map_err(|e| QueueError::ClaimError(format!("Failed to pop a job id from the index: {}", e)))?;

        let Some(job_id) = job_id else {
            return Ok(None);
        };

        // The token is already consumed; a failed claim strands it as well
        let claimed = match self.store.claim_by_id(&job_id).await {
            Ok(claimed) => claimed,
            Err(e) => {
                self.counters.stranded_tokens.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(job_id = %job_id, error = %e, "Claim failed after index pop, token dropped");
                return Err(e);
            }
        };

        match claimed {
            Some(job) => {
                tracing::debug!("Claimed job {}", job.job_id);
                Ok(Some(job))
            }
            None => {
                self.counters.stranded_tokens.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    job_id = %job_id,
                    "Index token matched no unclaimed row, token dropped"
                );
                Ok(None)
            }
        }
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
        BackendKind::Hybrid
    }
}
