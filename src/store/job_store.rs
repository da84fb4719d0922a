use chrono::Utc;
use sqlx::PgPool;

use crate::config::DatabaseConfig;
use crate::error::{QueueError, QueueResult};
use crate::models::{FinishedJob, JobId, QueuedJob};

// Arbitrary key shared by every process creating the schema
const SCHEMA_LOCK_KEY: i64 = 0x6a6f_6273;

const CREATE_QUEUED_JOBS: &str = r#"
    CREATE TABLE IF NOT EXISTS queued_jobs (
        job_id       TEXT PRIMARY KEY,
        created_time TIMESTAMPTZ NOT NULL,
        started_time TIMESTAMPTZ,
        difficulty   BIGINT NOT NULL
    )
"#;

const CREATE_QUEUED_JOBS_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS queued_jobs_created_time_idx ON queued_jobs (created_time)
"#;

const CREATE_FINISHED_JOBS: &str = r#"
    CREATE TABLE IF NOT EXISTS finished_jobs (
        job_id       TEXT PRIMARY KEY,
        started_time TIMESTAMPTZ NOT NULL,
        duration_ms  BIGINT NOT NULL
    )
"#;

const INSERT_QUEUED_JOB: &str = r#"
    INSERT INTO queued_jobs (job_id, created_time, difficulty)
    VALUES ($1, $2, $3)
"#;

/// Claims the oldest unclaimed row. Rows locked by concurrent claims are
/// skipped rather than waited on.
const CLAIM_OLDEST: &str = r#"
    UPDATE queued_jobs
    SET started_time = $1
    WHERE job_id = (
        SELECT job_id
        FROM queued_jobs inner_queued_jobs
        WHERE inner_queued_jobs.started_time IS NULL
        ORDER BY inner_queued_jobs.created_time ASC
        LIMIT 1
        FOR UPDATE SKIP LOCKED
    )
    RETURNING job_id, created_time, started_time, difficulty
"#;

const CLAIM_BY_ID: &str = r#"
    UPDATE queued_jobs
    SET started_time = $1
    WHERE job_id = $2 AND started_time IS NULL
    RETURNING job_id, created_time, started_time, difficulty
"#;

const DELETE_CLAIMED: &str = r#"
    DELETE FROM queued_jobs
    WHERE job_id = $1 AND started_time IS NOT NULL
    RETURNING job_id, created_time, started_time, difficulty
"#;

const INSERT_FINISHED_JOB: &str = r#"
    INSERT INTO finished_jobs (job_id, started_time, duration_ms)
    VALUES ($1, $2, $3)
"#;

/// Durable store driver over a Postgres pool
#[derive(Debug, Clone)]
pub struct JobStore {
    pool: PgPool,
}

impl JobStore {
    /// Connect and make sure the schema exists
    pub async fn connect(config: &DatabaseConfig) -> QueueResult<Self> {
        let pool = config.create_pool().await.map_err(|e| {
            QueueError::ConnectionError(format!(
                "Failed to connect to Postgres at {}: {}",
                config.display_target(),
                e
            ))
        })?;

        let store = Self::from_pool(pool);
        store.init_schema().await?;

        tracing::info!("Job store connected to {}", config.display_target());
        Ok(store)
    }

    /// Wrap an existing pool. The schema is not touched.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create both tables and the creation-time index if missing.
    ///
    /// Runs under a transaction-scoped advisory lock so processes starting
    /// together do not race on the catalog.
    pub async fn init_schema(&self) -> QueueResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            QueueError::ConnectionError(format!("Failed to open schema transaction: {}", e))
        })?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(SCHEMA_LOCK_KEY)
            .execute(&mut *tx)
            .await
            .map_err(|e| schema_error("take the schema lock", e))?;

        for statement in [CREATE_QUEUED_JOBS, CREATE_QUEUED_JOBS_INDEX, CREATE_FINISHED_JOBS] {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| schema_error("create the queue schema", e))?;
        }

        tx.commit().await.map_err(|e| schema_error("commit the queue schema", e))?;

        tracing::debug!("Schema for queued_jobs and finished_jobs is in place");
        Ok(())
    }

    /// Persist a new unclaimed job. Any `started_time` on the input is ignored.
    pub async fn insert_job(&self, job: &QueuedJob) -> QueueResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| insert_error(&job.job_id, e))?;

        sqlx::query(INSERT_QUEUED_JOB)
            .bind(&job.job_id)
            .bind(job.created_time)
            .bind(job.difficulty)
            .execute(&mut *tx)
            .await
            .map_err(|e| insert_error(&job.job_id, e))?;

        tx.commit().await.map_err(|e| insert_error(&job.job_id, e))?;

        Ok(())
    }

    /// Claim the oldest unclaimed job not currently locked by another claim
    pub async fn claim_oldest(&self) -> QueueResult<Option<QueuedJob>> {
        let mut tx = self.pool.begin().await.map_err(claim_error)?;

        let claimed = sqlx::query_as::<_, QueuedJob>(CLAIM_OLDEST)
            .bind(Utc::now())
            .fetch_optional(&mut *tx)
            .await
            .map_err(claim_error)?;

        tx.commit().await.map_err(claim_error)?;

        Ok(claimed)
    }

    /// Claim one specific job, only if it still exists and is unclaimed
    pub async fn claim_by_id(&self, job_id: &str) -> QueueResult<Option<QueuedJob>> {
        let mut tx = self.pool.begin().await.map_err(claim_error)?;

        let claimed = sqlx::query_as::<_, QueuedJob>(CLAIM_BY_ID)
            .bind(Utc::now())
            .bind(job_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| QueueError::ClaimError(format!("Failed to claim queued job {}: {}", job_id, e)))?;

        tx.commit().await.map_err(claim_error)?;

        Ok(claimed)
    }

    /// Move a claimed job to `finished_jobs`.
    ///
    /// The delete and the insert commit together or not at all.
    pub async fn complete_job(&self, job_id: &str) -> QueueResult<FinishedJob> {
        let mut tx = self.pool.begin().await.map_err(|e| remove_error(job_id, e))?;

        let deleted = sqlx::query_as::<_, QueuedJob>(DELETE_CLAIMED)
            .bind(job_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| remove_error(job_id, e))?;

        // Dropping `tx` rolls back the (empty) delete
        let Some(started_time) = deleted.and_then(|job| job.started_time) else {
            return Err(QueueError::NotFound(format!(
                "No claimed job with ID {} in queued_jobs",
                job_id
            )));
        };

        let finished = FinishedJob::completed(job_id.to_string(), started_time, Utc::now());

        sqlx::query(INSERT_FINISHED_JOB)
            .bind(&finished.job_id)
            .bind(finished.started_time)
            .bind(finished.duration_ms)
            .execute(&mut *tx)
            .await
            .map_err(|e| remove_error(job_id, e))?;

        tx.commit().await.map_err(|e| remove_error(job_id, e))?;

        Ok(finished)
    }

    /// Unconditionally delete a queued row. Returns whether a row was removed.
    pub async fn delete_job(&self, job_id: &str) -> QueueResult<bool> {
        let result = sqlx::query("DELETE FROM queued_jobs WHERE job_id = $1")
            .bind(job_id)
            .execute(&self.pool)
            .await
            .map_err(|e| query_error(&format!("delete queued job {}", job_id), e))?;

        Ok(result.rows_affected() > 0)
    }

    /// Rows in `queued_jobs`, claimed and unclaimed
    pub async fn count_queued(&self) -> QueueResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM queued_jobs")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| query_error("count queued_jobs", e))?;

        Ok(count)
    }

    pub async fn queued_job(&self, job_id: &str) -> QueueResult<Option<QueuedJob>> {
        let job = sqlx::query_as::<_, QueuedJob>(
            "SELECT job_id, created_time, started_time, difficulty FROM queued_jobs WHERE job_id = $1",
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_error(&format!("read queued job {}", job_id), e))?;

        Ok(job)
    }

    pub async fn finished_job(&self, job_id: &str) -> QueueResult<Option<FinishedJob>> {
        let job = sqlx::query_as::<_, FinishedJob>(
            "SELECT job_id, started_time, duration_ms FROM finished_jobs WHERE job_id = $1",
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_error(&format!("read finished job {}", job_id), e))?;

        Ok(job)
    }

    pub async fn count_finished(&self) -> QueueResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM finished_jobs")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| query_error("count finished_jobs", e))?;

        Ok(count)
    }
}

fn insert_error(job_id: &JobId, e: sqlx::Error) -> QueueError {
    QueueError::InsertError(format!("Failed to insert queued job {}: {}", job_id, e))
}

fn remove_error(job_id: &str, e: sqlx::Error) -> QueueError {
    QueueError::RemoveError(format!("Failed to move job {} to finished_jobs: {}", job_id, e))
}

fn claim_error(e: sqlx::Error) -> QueueError {
    QueueError::ClaimError(format!("Failed to claim a queued job: {}", e))
}

fn query_error(operation: &str, e: sqlx::Error) -> QueueError {
    QueueError::DatabaseError(format!("Failed to {}: {}", operation, e))
}

fn schema_error(operation: &str, e: sqlx::Error) -> QueueError {
    QueueError::ConnectionError(format!("Failed to {}: {}", operation, e))
}
