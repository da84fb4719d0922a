use pg_hybrid_queue::config::{AppConfig, ConsumerConfig, DatabaseConfig, RedisConfig};
use pg_hybrid_queue::connect_queue;
use pg_hybrid_queue::utils::setup_logging;
use pg_hybrid_queue::workers::run_consumer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configurations
    let app_config = AppConfig::from_env()?;
    setup_logging(&app_config);

    tracing::info!("Starting worker");

    if let Err(e) = run().await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run() -> anyhow::Result<()> {
    let db_config = DatabaseConfig::from_env()?;
    let redis_config = RedisConfig::from_env()?;
    let consumer_config = ConsumerConfig::from_env()?;

    let queue = connect_queue(&db_config, redis_config.as_ref()).await?;

    let report = run_consumer(queue.as_ref(), &consumer_config).await?;
    tracing::info!(
        "Worker finished: {} jobs executed in {:.1}s ({:.0} jobs/s)",
        report.executed,
        report.elapsed.as_secs_f64(),
        report.jobs_per_second()
    );

    Ok(())
}
