use pg_hybrid_queue::config::{AppConfig, DatabaseConfig, LoaderConfig, RedisConfig};
use pg_hybrid_queue::connect_queue;
use pg_hybrid_queue::utils::setup_logging;
use pg_hybrid_queue::workers::run_loader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configurations
    let app_config = AppConfig::from_env()?;
    setup_logging(&app_config);

    tracing::info!("Starting loader");

    if let Err(e) = run().await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let db_config = DatabaseConfig::from_env()?;
    let redis_config = RedisConfig::from_env()?;
    let loader_config = LoaderConfig::from_env()?;

    let queue = connect_queue(&db_config, redis_config.as_ref()).await?;

    let report = run_loader(queue.as_ref(), &loader_config).await?;
    tracing::info!("Loader finished: {} jobs inserted", report.inserted);

    Ok(())
}
