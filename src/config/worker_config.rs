use std::time::Duration;

use config::{Config, ConfigError};

use super::{env_source, int_or, to_positive};

/// Loader (producer) tuning
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Insertion pauses while the queue holds at least this many rows
    pub max_queue_size: i64,
    /// Jobs inserted between two size checks
    pub batch_size: usize,
    pub pause_when_full: Duration,
    /// Stop after this many insert attempts. 0 means run forever.
    pub max_jobs: u64,
    pub max_difficulty: i64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_queue_size: 1_000_000,
            batch_size: 100,
            pause_when_full: Duration::from_millis(10),
            max_jobs: 0,
            max_difficulty: 10_000,
        }
    }
}

impl LoaderConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&env_source()?)
    }

    pub fn from_source(cfg: &Config) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            max_queue_size: to_positive(
                "LOADER_MAX_QUEUE_SIZE",
                int_or(cfg, "LOADER_MAX_QUEUE_SIZE", defaults.max_queue_size)?,
            )?,
            batch_size: to_positive("LOADER_BATCH_SIZE", int_or(cfg, "LOADER_BATCH_SIZE", defaults.batch_size as i64)?)?,
            pause_when_full: Duration::from_millis(to_positive(
                "LOADER_PAUSE_MS",
                int_or(cfg, "LOADER_PAUSE_MS", defaults.pause_when_full.as_millis() as i64)?,
            )?),
            max_jobs: to_positive("LOADER_MAX_JOBS", int_or(cfg, "LOADER_MAX_JOBS", 0)?)?,
            max_difficulty: to_positive(
                "LOADER_MAX_DIFFICULTY",
                int_or(cfg, "LOADER_MAX_DIFFICULTY", defaults.max_difficulty)?,
            )?,
        })
    }
}

/// Consumer (worker) tuning
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Consecutive empty fetches tolerated before the consumer stops
    pub max_empty_retries: u32,
    pub retry_interval: Duration,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            max_empty_retries: 1_000,
            retry_interval: Duration::from_millis(10),
        }
    }
}

impl ConsumerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&env_source()?)
    }

    pub fn from_source(cfg: &Config) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            max_empty_retries: to_positive(
                "CONSUMER_MAX_EMPTY_RETRIES",
                int_or(cfg, "CONSUMER_MAX_EMPTY_RETRIES", defaults.max_empty_retries as i64)?,
            )?,
            retry_interval: Duration::from_millis(to_positive(
                "CONSUMER_RETRY_INTERVAL_MS",
                int_or(cfg, "CONSUMER_RETRY_INTERVAL_MS", defaults.retry_interval.as_millis() as i64)?,
            )?),
        })
    }
}
