pub mod finished_job;
pub mod queued_job;

pub use finished_job::FinishedJob;
pub use queued_job::{JobId, QueuedJob};
