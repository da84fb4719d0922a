#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use pg_hybrid_queue::config::{DatabaseConfig, RedisConfig};
use pg_hybrid_queue::{HybridQueue, JobStore, OrderingIndex, PostgresQueue, QueuedJob};
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::postgres::Postgres;
use testcontainers_modules::redis::{Redis, REDIS_PORT};

pub const QUEUE_KEY: &str = "queue";

/// Postgres container plus a connected store. Dropping it stops the container.
pub struct PostgresFixture {
    pub store: JobStore,
    pub database_url: String,
    _container: ContainerAsync<Postgres>,
}

pub struct RedisFixture {
    pub index: OrderingIndex,
    pub redis_url: String,
    _container: ContainerAsync<Redis>,
}

pub async fn start_postgres() -> PostgresFixture {
    let container = Postgres::default()
        .start()
        .await
        .expect("Failed to start Postgres container");

    let host = container.get_host().await.expect("container host");
    let port = container.get_host_port_ipv4(5432).await.expect("container port");
    let database_url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

    let store = JobStore::connect(&DatabaseConfig::from_url(database_url.clone()))
        .await
        .expect("Failed to connect job store");

    PostgresFixture {
        store,
        database_url,
        _container: container,
    }
}

pub async fn start_redis() -> RedisFixture {
    let container = Redis::default()
        .start()
        .await
        .expect("Failed to start Redis container");

    let host = container.get_host().await.expect("container host");
    let port = container.get_host_port_ipv4(REDIS_PORT).await.expect("container port");
    let redis_url = format!("redis://{}:{}", host, port);

    let index = OrderingIndex::connect(&RedisConfig::from_url(redis_url.clone()).with_queue_key(QUEUE_KEY))
        .await
        .expect("Failed to connect ordering index");

    RedisFixture {
        index,
        redis_url,
        _container: container,
    }
}

pub async fn postgres_queue() -> (PostgresQueue, PostgresFixture) {
    let pg = start_postgres().await;
    (PostgresQueue::new(pg.store.clone()), pg)
}

pub async fn hybrid_queue() -> (HybridQueue, PostgresFixture, RedisFixture) {
    let pg = start_postgres().await;
    let redis = start_redis().await;
    (HybridQueue::new(pg.store.clone(), redis.index.clone()), pg, redis)
}

/// Job created `offset_secs` after a fixed base instant
pub fn job_at(base: DateTime<Utc>, offset_secs: i64) -> QueuedJob {
    QueuedJob::new(offset_secs).with_created_time(base + Duration::seconds(offset_secs))
}
