pub mod app_config;
pub mod database;
pub mod redis_config;
pub mod worker_config;

pub use app_config::AppConfig;
pub use database::DatabaseConfig;
pub use redis_config::RedisConfig;
pub use worker_config::{ConsumerConfig, LoaderConfig};

use config::{Config, ConfigError, Environment};

/// Load `.env` (if any) and snapshot the process environment
pub fn env_source() -> Result<Config, ConfigError> {
    dotenv::dotenv().ok();

    Config::builder()
        .add_source(Environment::default())
        .build()
}

// Environment keys are stored lowercased, so lookups are too
pub(crate) fn string_or(cfg: &Config, key: &str, default: &str) -> String {
    cfg.get_string(&key.to_lowercase()).unwrap_or_else(|_| default.to_string())
}

/// Unset and blank values both read as `None`
pub(crate) fn opt_string(cfg: &Config, key: &str) -> Option<String> {
    cfg.get_string(&key.to_lowercase())
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Missing keys fall back to `default`, malformed ones are an error
pub(crate) fn int_or(cfg: &Config, key: &str, default: i64) -> Result<i64, ConfigError> {
    match cfg.get_int(&key.to_lowercase()) {
        Ok(value) => Ok(value),
        Err(ConfigError::NotFound(_)) => Ok(default),
        Err(e) => Err(e),
    }
}

pub(crate) fn to_u16(key: &str, value: i64) -> Result<u16, ConfigError> {
    u16::try_from(value)
        .map_err(|_| ConfigError::Message(format!("{} value {} is out of range for a port", key, value)))
}

pub(crate) fn to_positive<T: TryFrom<i64>>(key: &str, value: i64) -> Result<T, ConfigError> {
    if value < 0 {
        return Err(ConfigError::Message(format!("{} must not be negative, got {}", key, value)));
    }
    T::try_from(value).map_err(|_| ConfigError::Message(format!("{} value {} is out of range", key, value)))
}

#[cfg(test)]
pub(crate) fn source_from(pairs: &[(&str, &str)]) -> Config {
    let map = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect::<std::collections::HashMap<_, _>>();

    Config::builder()
        .add_source(Environment::default().source(Some(map)))
        .build()
        .expect("static test source")
}
