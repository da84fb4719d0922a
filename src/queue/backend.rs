use std::fmt;

use super::{HybridQueue, JobQueue, PostgresQueue};
use crate::config::{DatabaseConfig, RedisConfig};
use crate::error::QueueResult;
use crate::store::{JobStore, OrderingIndex};

/// Which backend serves the queue contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Postgres only
    Postgres,
    /// Redis ordering index in front of Postgres
    Hybrid,
}

impl BackendKind {
    /// The hybrid backend is used whenever an index store is configured
    pub fn select(redis: Option<&RedisConfig>) -> Self {
        match redis {
            Some(_) => BackendKind::Hybrid,
            None => BackendKind::Postgres,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Postgres => "postgres",
            BackendKind::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connect the stores and build the configured backend.
///
/// Connection failures surface as `QueueError::ConnectionError`.
pub async fn connect_queue(
    database: &DatabaseConfig,
    redis: Option<&RedisConfig>,
) -> QueueResult<Box<dyn JobQueue>> {
    let store = JobStore::connect(database).await?;

    let queue: Box<dyn JobQueue> = match (BackendKind::select(redis), redis) {
        (BackendKind::Hybrid, Some(redis)) => {
            let index = OrderingIndex::connect(redis).await?;
            Box::new(HybridQueue::new(store, index))
        }
        _ => Box::new(PostgresQueue::new(store)),
    };

    tracing::info!("Using {} queue backend", queue.backend());
    Ok(queue)
}
