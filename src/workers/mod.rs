//! Polling loops that drive a [`JobQueue`](crate::queue::JobQueue).
//!
//! Neither loop retries a failed queue call: any error is returned to the
//! binary, which exits.

mod consumer;
mod loader;

pub use consumer::{execute_job, run_consumer, ConsumerReport};
pub use loader::{run_loader, LoaderReport};
