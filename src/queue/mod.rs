//! The queue contract and its two backends.
//!
//! - [`PostgresQueue`] claims rows straight from `queued_jobs` with
//!   `FOR UPDATE SKIP LOCKED`.
//! - [`HybridQueue`] pops a candidate id from the Redis [`OrderingIndex`] and
//!   claims exactly that row.
//!
//! Pick one with [`connect_queue`]; the choice is fixed for the life of the
//! process.
//!
//! [`OrderingIndex`]: crate::store::OrderingIndex

mod backend;
mod hybrid_queue;
mod postgres_queue;
mod traits;

pub use backend::{connect_queue, BackendKind};
pub use hybrid_queue::{DriftStats, HybridQueue};
pub use postgres_queue::PostgresQueue;
pub use traits::JobQueue;
