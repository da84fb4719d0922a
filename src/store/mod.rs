//! Store drivers.
//!
//! [`JobStore`] owns the Postgres schema and is the record of truth for job
//! existence and claim state. [`OrderingIndex`] is a Redis list of job ids the
//! hybrid backend uses to decide which row to claim next; it carries no state
//! of its own and may drift from the table.

mod job_store;
mod ordering_index;

pub use job_store::JobStore;
pub use ordering_index::OrderingIndex;
