use thiserror::Error;

/// Queue error types
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("Insert error: {0}")]
    InsertError(String),

    #[error("Claim error: {0}")]
    ClaimError(String),

    #[error("Remove error: {0}")]
    RemoveError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Redis error: {0}")]
    RedisError(String),
}

impl QueueError {
    /// Stable code used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            QueueError::ConnectionError(_) => "CONNECTION_ERROR",
            QueueError::ConfigError(_) => "CONFIG_ERROR",
            QueueError::InsertError(_) => "INSERT_ERROR",
            QueueError::ClaimError(_) => "CLAIM_ERROR",
            QueueError::RemoveError(_) => "REMOVE_ERROR",
            QueueError::NotFound(_) => "NOT_FOUND",
            QueueError::DatabaseError(_) => "DATABASE_ERROR",
            QueueError::RedisError(_) => "REDIS_ERROR",
        }
    }

    /// Whether the failure came from a store round-trip rather than from the
    /// caller's input or the process configuration.
    ///
    /// The worker loops still treat every error as fatal; this only informs
    /// callers that want to retry on their own.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            QueueError::InsertError(_)
                | QueueError::ClaimError(_)
                | QueueError::RemoveError(_)
                | QueueError::DatabaseError(_)
                | QueueError::RedisError(_)
        )
    }
}

// Implement From for redis errors
impl From<redis::RedisError> for QueueError {
    fn from(err: redis::RedisError) -> Self {
        QueueError::RedisError(err.to_string())
    }
}

// Implement From for deadpool errors
impl From<deadpool_redis::PoolError> for QueueError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        QueueError::RedisError(err.to_string())
    }
}

// Result type alias
pub type QueueResult<T> = Result<T, QueueError>;
