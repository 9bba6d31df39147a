//! Worker pool scheduler.
//!
//! Runs one round of jobs with at most `max_concurrency` workers in flight,
//! starting jobs in input order and returning once every started worker has
//! finished or been abandoned.

mod pool;
mod progress;

pub use pool::{run_all, PoolOptions};
pub use progress::PoolReport;
