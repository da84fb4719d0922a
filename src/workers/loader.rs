use std::time::{Duration, Instant};

use tokio::time::sleep;

use crate::config::LoaderConfig;
use crate::error::{QueueError, QueueResult};
use crate::models::QueuedJob;
use crate::queue::JobQueue;

const REPORT_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoaderReport {
    pub inserted: u64,
    pub failed: u64,
}

impl LoaderReport {
    pub fn attempted(&self) -> u64 {
        self.inserted + self.failed
    }
}

/// Fill the queue with random jobs, pausing while it holds
/// `max_queue_size` rows or more.
///
/// Runs until `max_jobs` inserts were attempted (forever when it is 0). A
/// failed insert is logged and counted without stopping the batch; the loop
/// then ends with an error if any insert failed. A failed size check is
/// returned immediately.
pub async fn run_loader(queue: &dyn JobQueue, config: &LoaderConfig) -> QueueResult<LoaderReport> {
    let mut report = LoaderReport::default();
    let batch_size = config.batch_size.max(1);
    let budget_spent = |report: &LoaderReport| config.max_jobs > 0 && report.attempted() >= config.max_jobs;

    let mut last_size_report = Instant::now();

    while !budget_spent(&report) {
        let queued = queue.size().await?;

        if last_size_report.elapsed() > REPORT_INTERVAL {
            tracing::info!("Queue size:|{:6}|", queued);
            last_size_report = Instant::now();
        }

        if queued >= config.max_queue_size {
            tracing::debug!("Too many queued jobs. Pausing for {:?}", config.pause_when_full);
            sleep(config.pause_when_full).await;
            continue;
        }

        for _ in 0..batch_size {
            if budget_spent(&report) {
                break;
            }

            let job = QueuedJob::random(config.max_difficulty);
            tracing::debug!("Inserting job with ID {}", job.job_id);

            match queue.insert(&job).await {
                Ok(()) => report.inserted += 1,
                Err(e) => {
                    tracing::error!(kind = e.kind(), "An error occurred inserting job with ID {}: {}", job.job_id, e);
                    report.failed += 1;
                }
            }
        }
    }

    if report.failed > 0 {
        return Err(QueueError::InsertError(format!(
            "Inserted {} jobs but {} insertion errors occurred",
            report.inserted, report.failed
        )));
    }

    tracing::info!("Successfully inserted {} jobs", report.inserted);
    Ok(report)
}
