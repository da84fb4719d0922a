use std::str::FromStr;
use std::time::Duration;

use config::{Config, ConfigError};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

use super::{env_source, int_or, opt_string, string_or, to_positive, to_u16};

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    /// Full DSN. When set it wins over the individual parts.
    pub url: Option<String>,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&env_source()?)
    }

    pub fn from_source(cfg: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            host: string_or(cfg, "DB_HOST", "localhost"),
            port: to_u16("DB_PORT", int_or(cfg, "DB_PORT", 5432)?)?,
            name: string_or(cfg, "DB_NAME", "postgres"),
            user: string_or(cfg, "DB_USER", "postgres"),
            password: string_or(cfg, "DB_PASSWORD", "password"),
            url: opt_string(cfg, "DATABASE_URL"),
            max_connections: to_positive("DB_MAX_CONNECTIONS", int_or(cfg, "DB_MAX_CONNECTIONS", 10)?)?,
        })
    }

    /// Build a config from a DSN, keeping the other defaults
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            name: "postgres".to_string(),
            user: "postgres".to_string(),
            password: "password".to_string(),
            url: Some(url.into()),
            max_connections: 10,
        }
    }

    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        match &self.url {
            Some(url) => PgConnectOptions::from_str(url),
            None => Ok(PgConnectOptions::new()
                .host(&self.host)
                .port(self.port)
                .database(&self.name)
                .username(&self.user)
                .password(&self.password)),
        }
    }

    pub async fn create_pool(&self) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(self.connect_options()?)
            .await
    }

    /// Location string safe to log (no credentials)
    pub fn display_target(&self) -> String {
        match &self.url {
            Some(url) => match url.rsplit_once('@') {
                Some((_, host_part)) => host_part.to_string(),
                None => url.clone(),
            },
            None => format!("{}:{}/{}", self.host, self.port, self.name),
        }
    }
}
