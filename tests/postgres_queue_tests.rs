mod common;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use pg_hybrid_queue::{BackendKind, JobQueue, JobStore, QueueError, QueuedJob};

use common::{job_at, postgres_queue};

#[tokio::test]
async fn insert_fetch_remove_round_trip() {
    let (queue, pg) = postgres_queue().await;
    let before = queue.size().await.unwrap();

    let job = QueuedJob::new(17);
    queue.insert(&job).await.unwrap();
    assert_eq!(queue.size().await.unwrap(), before + 1);

    let claimed = queue.fetch_tentatively().await.unwrap().expect("job should be claimable");
    assert_eq!(claimed.job_id, job.job_id);
    assert_eq!(claimed.difficulty, 17);
    assert!(claimed.started_time.is_some());

    // Claimed rows still count
    assert_eq!(queue.size().await.unwrap(), before + 1);

    let finished = queue.remove(&job.job_id).await.unwrap();
    assert!(finished.duration_ms >= 0);
    assert_eq!(Some(finished.started_time), claimed.started_time);
    assert_eq!(queue.size().await.unwrap(), before);

    let stored = pg.store.finished_job(&job.job_id).await.unwrap().expect("finished row");
    assert_eq!(stored, finished);
    assert_eq!(pg.store.count_finished().await.unwrap(), 1);
    assert_eq!(queue.backend(), BackendKind::Postgres);
}

#[tokio::test]
async fn fetches_in_creation_order() {
    let (queue, _pg) = postgres_queue().await;
    let base = Utc::now();
    let a = job_at(base, 1);
    let b = job_at(base, 2);
    let c = job_at(base, 3);

    // Insertion order must not matter, only created_time
    for job in [&c, &a, &b] {
        queue.insert(job).await.unwrap();
    }

    let mut fetched = Vec::new();
    while let Some(job) = queue.fetch_tentatively().await.unwrap() {
        fetched.push(job.job_id);
    }

    assert_eq!(fetched, vec![a.job_id, b.job_id, c.job_id]);
}

#[tokio::test]
async fn empty_queue_fetch_is_not_an_error() {
    let (queue, pg) = postgres_queue().await;

    for _ in 0..5 {
        assert!(queue.fetch_tentatively().await.unwrap().is_none());
    }

    assert_eq!(queue.size().await.unwrap(), 0);
    assert_eq!(pg.store.count_finished().await.unwrap(), 0);
}

#[tokio::test]
async fn claimed_job_is_not_fetched_again() {
    let (queue, _pg) = postgres_queue().await;
    queue.insert(&QueuedJob::new(1)).await.unwrap();

    assert!(queue.fetch_tentatively().await.unwrap().is_some());
    assert!(queue.fetch_tentatively().await.unwrap().is_none());
    assert_eq!(queue.size().await.unwrap(), 1);
}

#[tokio::test]
async fn second_remove_is_not_found() {
    let (queue, pg) = postgres_queue().await;
    let job = QueuedJob::new(3);
    queue.insert(&job).await.unwrap();
    queue.fetch_tentatively().await.unwrap().expect("claim");

    queue.remove(&job.job_id).await.unwrap();
    let err = queue.remove(&job.job_id).await.unwrap_err();

    assert!(matches!(err, QueueError::NotFound(_)), "unexpected error: {err:?}");
    assert_eq!(pg.store.count_finished().await.unwrap(), 1);
}

#[tokio::test]
async fn removing_unclaimed_job_is_not_found() {
    let (queue, pg) = postgres_queue().await;
    let job = QueuedJob::new(3);
    queue.insert(&job).await.unwrap();

    let err = queue.remove(&job.job_id).await.unwrap_err();
    assert!(matches!(err, QueueError::NotFound(_)));

    // Nothing moved
    let still_queued = pg.store.queued_job(&job.job_id).await.unwrap().expect("row kept");
    assert!(still_queued.started_time.is_none());
    assert_eq!(pg.store.count_finished().await.unwrap(), 0);
}

#[tokio::test]
async fn removing_unknown_job_is_not_found() {
    let (queue, _pg) = postgres_queue().await;
    let err = queue.remove("does-not-exist").await.unwrap_err();
    assert!(matches!(err, QueueError::NotFound(_)));
}

#[tokio::test]
async fn duplicate_insert_is_an_insert_error() {
    let (queue, _pg) = postgres_queue().await;
    let job = QueuedJob::new(1);
    queue.insert(&job).await.unwrap();

    let err = queue.insert(&job).await.unwrap_err();
    assert!(matches!(err, QueueError::InsertError(_)), "unexpected error: {err:?}");
    assert_eq!(queue.size().await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn only_one_concurrent_fetcher_claims_a_single_job() {
    let (queue, _pg) = postgres_queue().await;
    let job = QueuedJob::new(5);
    queue.insert(&job).await.unwrap();

    let queue = Arc::new(queue);
    let mut handles = Vec::new();
    for _ in 0..16 {
        let queue = queue.clone();
        handles.push(tokio::spawn(async move { queue.fetch_tentatively().await }));
    }

    let mut winners = Vec::new();
    for handle in handles {
        if let Some(claimed) = handle.await.unwrap().unwrap() {
            winners.push(claimed.job_id);
        }
    }

    assert_eq!(winners, vec![job.job_id]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_fetchers_claim_distinct_jobs() {
    let (queue, _pg) = postgres_queue().await;
    let total = 60;
    for difficulty in 0..total {
        queue.insert(&QueuedJob::new(difficulty)).await.unwrap();
    }

    let queue = Arc::new(queue);
    let mut handles = Vec::new();
    for _ in 0..8 {
        let queue = queue.clone();
        handles.push(tokio::spawn(async move {
            let mut claimed = Vec::new();
            while let Some(job) = queue.fetch_tentatively().await.unwrap() {
                claimed.push(job.job_id);
            }
            claimed
        }));
    }

    let mut all = Vec::new();
    for handle in handles {
        all.extend(handle.await.unwrap());
    }

    // A fetcher may stop early when every remaining row was locked
    while let Some(job) = queue.fetch_tentatively().await.unwrap() {
        all.push(job.job_id);
    }

    let unique: HashSet<_> = all.iter().cloned().collect();
    assert_eq!(unique.len(), all.len(), "a job was claimed twice");
    assert_eq!(all.len(), total as usize);
}

#[tokio::test]
async fn schema_creation_is_idempotent() {
    let (queue, pg) = postgres_queue().await;
    queue.insert(&QueuedJob::new(1)).await.unwrap();

    pg.store.init_schema().await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let store = JobStore::from_pool(pg.store.pool().clone());
        handles.push(tokio::spawn(async move { store.init_schema().await }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // Existing rows survive
    assert_eq!(queue.size().await.unwrap(), 1);
}
