//! Per-round pool accounting.

use crate::job::JobDescriptor;

/// What happened to the workers of one round. Says nothing about success;
/// only the verifier decides that.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolReport {
    /// Workers started (each job exactly once).
    pub started: usize,
    /// Workers that returned within their deadline.
    pub finished: usize,
    /// Jobs whose worker exceeded the per-job timeout and was left behind.
    pub abandoned: Vec<JobDescriptor>,
    /// Jobs whose worker panicked.
    pub crashed: Vec<JobDescriptor>,
}

impl PoolReport {
    /// Workers that ended without returning normally.
    pub fn unfinished(&self) -> usize {
        self.abandoned.len() + self.crashed.len()
    }
}
