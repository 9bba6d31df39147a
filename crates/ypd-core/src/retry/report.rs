//! Round summaries and the terminal batch report.

use crate::job::JobDescriptor;

/// Outcome counts for one completed round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSummary {
    /// 1-based round number.
    pub round: u32,
    /// Jobs scheduled in this round.
    pub attempted: usize,
    /// Of those, jobs verified as succeeded.
    pub succeeded: usize,
    /// Of those, jobs still failing.
    pub failed: usize,
}

/// Final partition of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Succeeded jobs, in input order.
    pub succeeded: Vec<JobDescriptor>,
    /// Permanently failed jobs, in input order.
    pub failed: Vec<JobDescriptor>,
    pub rounds: Vec<RoundSummary>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}
