use std::ffi::OsStr;
use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::AppConfig;

/// Setup console logging, plus a JSON file when `LOG_FILE` is set.
///
/// `RUST_LOG` takes precedence over `LOG_LEVEL`.
pub fn setup_logging(config: &AppConfig) {
    let file_layer = config.log_file.as_deref().map(|log_file| {
        let path = Path::new(log_file);
        let directory = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("logs"));

        // Create logs directory if it doesn't exist
        std::fs::create_dir_all(directory).ok();

        // File appender with daily rotation
        let file_appender = RollingFileAppender::new(
            Rotation::DAILY,
            directory,
            path.file_name().unwrap_or(OsStr::new("queue.log")),
        );

        fmt::layer()
            .with_writer(file_appender)
            .with_target(true)
            .with_ansi(false)
            .json()
    });

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .compact();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::info!("Logging initialized with level: {}", config.log_level);
}
