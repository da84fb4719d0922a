use async_trait::async_trait;

use super::BackendKind;
use crate::error::QueueResult;
use crate::models::{FinishedJob, QueuedJob};

/// Operations every queue backend provides.
///
/// All methods are safe to call concurrently from many tasks or processes.
/// Coordination happens inside the stores, never behind an in-process lock.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Persist a new unclaimed job
    async fn insert(&self, job: &QueuedJob) -> QueueResult<()>;

    /// Claim one unclaimed job and return it with `started_time` set.
    ///
    /// `Ok(None)` means nothing was claimable on this attempt. It is an
    /// expected outcome, not an error.
    async fn fetch_tentatively(&self) -> QueueResult<Option<QueuedJob>>;

    /// Delete a claimed job and append its completion record.
    ///
    /// Fails with `QueueError::NotFound` when no claimed row has this id.
    async fn remove(&self, job_id: &str) -> QueueResult<FinishedJob>;

    /// Rows currently in `queued_jobs`, claimed ones included
    async fn size(&self) -> QueueResult<i64>;

    fn backend(&self) -> BackendKind;
}
