use config::{Config, ConfigError};

use super::{env_source, opt_string, string_or};

/// Process-wide settings shared by the loader and the consumer
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_file: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&env_source()?)
    }

    pub fn from_source(cfg: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            log_level: string_or(cfg, "LOG_LEVEL", "info").to_lowercase(),
            log_file: opt_string(cfg, "LOG_FILE"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::source_from;

    #[test]
    fn defaults_to_info_without_file() {
        let cfg = AppConfig::from_source(&source_from(&[])).unwrap();
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.log_file.is_none());
    }

    #[test]
    fn reads_level_and_file() {
        let cfg = AppConfig::from_source(&source_from(&[
            ("LOG_LEVEL", "DEBUG"),
            ("LOG_FILE", "logs/consumer.log"),
        ]))
        .unwrap();
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.log_file.as_deref(), Some("logs/consumer.log"));
    }
}
