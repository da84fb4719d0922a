use std::time::{Duration, Instant};

use tokio::time::sleep;

use crate::config::ConsumerConfig;
use crate::error::QueueResult;
use crate::models::QueuedJob;
use crate::queue::JobQueue;

const REPORT_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsumerReport {
    pub executed: u64,
    pub elapsed: Duration,
}

impl ConsumerReport {
    pub fn jobs_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.executed as f64 / secs
        } else {
            0.0
        }
    }
}

/// Job execution is a placeholder; difficulty is only logged
pub async fn execute_job(job: &QueuedJob) -> QueueResult<()> {
    tracing::trace!("Executing job {} (difficulty {})", job.job_id, job.difficulty);
    Ok(())
}

/// Drain the queue until `max_empty_retries` consecutive fetches come back
/// empty. Every queue error ends the loop.
pub async fn run_consumer(queue: &dyn JobQueue, config: &ConsumerConfig) -> QueueResult<ConsumerReport> {
    let started = Instant::now();
    let mut executed: u64 = 0;
    let mut empty_fetches: u32 = 0;
    let mut last_rate_report = Instant::now();

    loop {
        let Some(job) = queue.fetch_tentatively().await? else {
            empty_fetches += 1;
            if empty_fetches >= config.max_empty_retries {
                tracing::info!(
                    "No more job to fetch from the queue after {} retries. Exiting",
                    config.max_empty_retries
                );
                break;
            }

            tracing::info!(
                "No more job to fetch from the queue. Will retry in {:?} ({}/{})",
                config.retry_interval,
                empty_fetches,
                config.max_empty_retries
            );
            sleep(config.retry_interval).await;
            continue;
        };
        empty_fetches = 0;

        tracing::debug!("Fetched job with ID {} (difficulty {})", job.job_id, job.difficulty);
        execute_job(&job).await?;

        tracing::debug!("Removing job {} from queue", job.job_id);
        queue.remove(&job.job_id).await?;
        tracing::debug!("Successfully executed job with ID {}", job.job_id);

        executed += 1;
        if last_rate_report.elapsed() > REPORT_INTERVAL {
            let report = ConsumerReport {
                executed,
                elapsed: started.elapsed(),
            };
            tracing::info!("Jobs Per Second:|{:6.0}|", report.jobs_per_second());
            last_rate_report = Instant::now();
        }
    }

    Ok(ConsumerReport {
        executed,
        elapsed: started.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workers::memory::MemoryQueue;

    fn config(max_empty_retries: u32) -> ConsumerConfig {
        ConsumerConfig {
            max_empty_retries,
            retry_interval: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn drains_queue_then_stops() {
        let queue = MemoryQueue::default();
        for difficulty in 0..12 {
            queue.insert(&QueuedJob::new(difficulty)).await.unwrap();
        }

        let report = run_consumer(&queue, &config(3)).await.unwrap();

        assert_eq!(report.executed, 12);
        assert_eq!(queue.size().await.unwrap(), 0);
        assert_eq!(queue.finished(), 12);
    }

    #[tokio::test]
    async fn empty_queue_stops_after_retries() {
        let queue = MemoryQueue::default();
        let report = run_consumer(&queue, &config(4)).await.unwrap();
        assert_eq!(report.executed, 0);
    }

    #[test]
    fn rate_handles_zero_elapsed() {
        let report = ConsumerReport {
            executed: 10,
            elapsed: Duration::ZERO,
        };
        assert_eq!(report.jobs_per_second(), 0.0);

        let report = ConsumerReport {
            executed: 10,
            elapsed: Duration::from_secs(2),
        };
        assert_eq!(report.jobs_per_second(), 5.0);
    }
}
