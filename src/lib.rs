//! Job queue engine with two interchangeable backends.
//!
//! Both implement [`JobQueue`]:
//!
//! - [`PostgresQueue`] claims the oldest unclaimed row using
//!   `FOR UPDATE SKIP LOCKED`, so concurrent consumers lock different rows
//!   instead of queueing behind each other.
//! - [`HybridQueue`] pops a candidate job id from a Redis list and claims
//!   that one row in Postgres. Postgres remains the record of truth; the list
//!   is a hint that can drift (see [`HybridQueue`] for the stranding case).
//!
//! The `loader` and `consumer` binaries drive the contract in a loop.

pub mod config;
pub mod error;
pub mod models;
pub mod queue;
pub mod store;
pub mod utils;
pub mod workers;

pub use error::{QueueError, QueueResult};
pub use models::{FinishedJob, JobId, QueuedJob};
pub use queue::{connect_queue, BackendKind, DriftStats, HybridQueue, JobQueue, PostgresQueue};
pub use store::{JobStore, OrderingIndex};
