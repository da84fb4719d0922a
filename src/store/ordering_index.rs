use deadpool_redis::redis::AsyncCommands;
use deadpool_redis::{Connection, Pool};

use crate::config::RedisConfig;
use crate::error::{QueueError, QueueResult};

/// FIFO list of job ids kept in Redis.
///
/// Ids are pushed on the left and popped from the right, so the oldest push
/// is popped first. Both ends are single Redis commands; there is no
/// read-modify-write on the client side.
#[derive(Clone)]
pub struct OrderingIndex {
    pool: Pool,
    key: String,
}

impl OrderingIndex {
    /// Create the pool and verify it with a PING
    pub async fn connect(config: &RedisConfig) -> QueueResult<Self> {
        let pool = config
            .create_pool()
            .map_err(|e| QueueError::ConnectionError(format!("Failed to create Redis pool: {}", e)))?;

        let index = Self::from_pool(pool, &config.queue_key);

        let mut conn = index
            .pool
            .get()
            .await
            .map_err(|e| QueueError::ConnectionError(format!("Failed to get Redis connection: {}", e)))?;

        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| QueueError::ConnectionError(format!("Redis ping failed: {}", e)))?;

        tracing::info!("Ordering index connected, list key '{}'", index.key);

        Ok(index)
    }

    pub fn from_pool(pool: Pool, key: &str) -> Self {
        Self {
            pool,
            key: key.to_string(),
        }
    }

    async fn get_connection(&self) -> QueueResult<Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| QueueError::RedisError(format!("Failed to get connection: {}", e)))
    }

    /// Push a job id on the head of the list (LPUSH)
    pub async fn push(&self, job_id: &str) -> QueueResult<()> {
        let mut conn = self.get_connection().await?;
        conn.lpush::<_, _, ()>(&self.key, job_id)
            .await
            .map_err(|e| QueueError::RedisError(format!("Failed to push {} onto '{}': {}", job_id, self.key, e)))
    }

    /// Pop the oldest job id from the tail of the list (RPOP).
    /// Does not block; returns `None` when the list is empty.
    pub async fn pop(&self) -> QueueResult<Option<String>> {
        let mut conn = self.get_connection().await?;
        conn.rpop(&self.key, None)
            .await
            .map_err(|e| QueueError::RedisError(format!("Failed to pop from '{}': {}", self.key, e)))
    }

    /// Current list length (LLEN)
    pub async fn len(&self) -> QueueResult<i64> {
        let mut conn = self.get_connection().await?;
        conn.llen(&self.key)
            .await
            .map_err(|e| QueueError::RedisError(format!("Failed to read length of '{}': {}", self.key, e)))
    }

    pub async fn is_empty(&self) -> QueueResult<bool> {
        Ok(self.len().await? == 0)
    }
}

impl std::fmt::Debug for OrderingIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderingIndex").field("key", &self.key).finish()
    }
}
