use config::{Config, ConfigError};
use deadpool_redis::{Pool, Runtime};
use redis::RedisError;

use super::{env_source, int_or, opt_string, string_or, to_positive};

pub const DEFAULT_QUEUE_KEY: &str = "queue";

/// Ordering index location. Its presence selects the hybrid backend.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    pub pool_size: usize,
    pub queue_key: String,
}

impl RedisConfig {
    /// Returns `None` when `REDIS_URL` is unset or empty
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        Self::from_source(&env_source()?)
    }

    pub fn from_source(cfg: &Config) -> Result<Option<Self>, ConfigError> {
        let Some(url) = opt_string(cfg, "REDIS_URL") else {
            return Ok(None);
        };

        Ok(Some(Self {
            url,
            pool_size: to_positive("REDIS_POOL_SIZE", int_or(cfg, "REDIS_POOL_SIZE", 10)?)?,
            queue_key: string_or(cfg, "REDIS_QUEUE_KEY", DEFAULT_QUEUE_KEY),
        }))
    }

    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pool_size: 10,
            queue_key: DEFAULT_QUEUE_KEY.to_string(),
        }
    }

    pub fn with_queue_key(mut self, queue_key: impl Into<String>) -> Self {
        self.queue_key = queue_key.into();
        self
    }

    pub fn create_pool(&self) -> Result<Pool, RedisError> {
        let cfg = deadpool_redis::Config {
            url: Some(self.url.clone()),
            pool: Some(deadpool_redis::PoolConfig {
                max_size: self.pool_size,
                ..Default::default()
            }),
            ..Default::default()
        };

        cfg.create_pool(Some(Runtime::Tokio1))
            .map_err(|e| RedisError::from((redis::ErrorKind::IoError, "Failed to create pool", e.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::source_from;

    #[test]
    fn absent_url_disables_index() {
        assert!(RedisConfig::from_source(&source_from(&[])).unwrap().is_none());
        assert!(RedisConfig::from_source(&source_from(&[("REDIS_URL", "  ")])).unwrap().is_none());
    }

    #[test]
    fn url_enables_index_with_defaults() {
        let cfg = RedisConfig::from_source(&source_from(&[("REDIS_URL", "redis://cache:6379/0")]))
            .unwrap()
            .unwrap();
        assert_eq!(cfg.url, "redis://cache:6379/0");
        assert_eq!(cfg.pool_size, 10);
        assert_eq!(cfg.queue_key, DEFAULT_QUEUE_KEY);
    }

    #[test]
    fn negative_pool_size_is_rejected() {
        let res = RedisConfig::from_source(&source_from(&[
            ("REDIS_URL", "redis://cache:6379/0"),
            ("REDIS_POOL_SIZE", "-1"),
        ]));
        assert!(res.is_err());
    }
}
