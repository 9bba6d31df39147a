//! Round state machine: `Round(n)` until nothing is pending or the ceiling is hit.

use crate::job::JobDescriptor;
use crate::verify::{FileClaims, Verification};

use super::report::{BatchReport, RoundSummary};

/// Controller state. `Round(n)` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    Round(u32),
    Done,
}

/// Tracks outstanding jobs across rounds.
///
/// Jobs are tracked by input index, so the pending set only ever loses
/// members: a job verified once as succeeded is never scheduled again.
/// The files that verified such a job stay attributed to it, so later rounds
/// cannot hand them to a different pending job.
#[derive(Debug, Clone)]
pub struct RetryController {
    jobs: Vec<JobDescriptor>,
    pending: Vec<usize>,
    max_rounds: u32,
    state: RoundState,
    rounds: Vec<RoundSummary>,
    settled: FileClaims,
}

impl RetryController {
    /// `max_rounds` counts every round including the first; values below 1
    /// act as 1. An empty job list starts in `Done`.
    pub fn new(jobs: Vec<JobDescriptor>, max_rounds: u32) -> Self {
        let state = if jobs.is_empty() {
            RoundState::Done
        } else {
            RoundState::Round(1)
        };
        Self {
            pending: (0..jobs.len()).collect(),
            jobs,
            max_rounds: max_rounds.max(1),
            state,
            rounds: Vec::new(),
            settled: FileClaims::new(),
        }
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    /// Current round number (the last round run once `Done`).
    pub fn round(&self) -> u32 {
        match self.state {
            RoundState::Round(n) => n,
            RoundState::Done => self.rounds.last().map_or(0, |r| r.round),
        }
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// Every job of the batch, in input order.
    pub fn jobs(&self) -> &[JobDescriptor] {
        &self.jobs
    }

    /// Jobs to schedule this round, in input order. Empty once `Done`.
    pub fn pending(&self) -> Vec<JobDescriptor> {
        if self.state == RoundState::Done {
            return Vec::new();
        }
        self.pending.iter().map(|&i| self.jobs[i].clone()).collect()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Files owned by jobs that left the pending set.
    pub fn settled_files(&self) -> &FileClaims {
        &self.settled
    }

    /// Records the verification of the current round and advances.
    ///
    /// `verification` may cover more jobs than are pending; only pending jobs
    /// listed in `verification.failed` stay pending. Calling this once `Done`
    /// changes nothing.
    pub fn record(&mut self, verification: &Verification) -> RoundState {
        let RoundState::Round(n) = self.state else {
            return RoundState::Done;
        };

        let attempted = self.pending.len();
        let jobs = &self.jobs;
        let mut verified = Vec::new();
        self.pending.retain(|&i| {
            let still_failed = verification.failed.iter().any(|f| f == &jobs[i]);
            if !still_failed {
                verified.push(i);
            }
            still_failed
        });
        for (name, &owner) in &verification.claims {
            if verified.contains(&owner) {
                self.settled.entry(name.clone()).or_insert(owner);
            }
        }
        let failed = self.pending.len();

        let summary = RoundSummary {
            round: n,
            attempted,
            succeeded: attempted - failed,
            failed,
        };
        tracing::info!(
            round = n,
            attempted,
            succeeded = summary.succeeded,
            failed,
            "round verified"
        );
        self.rounds.push(summary);

        self.state = if self.pending.is_empty() || n >= self.max_rounds {
            RoundState::Done
        } else {
            RoundState::Round(n + 1)
        };
        self.state
    }

    /// Terminal partition. Jobs still pending count as failed.
    pub fn into_report(self) -> BatchReport {
        let mut report = BatchReport {
            rounds: self.rounds,
            ..BatchReport::default()
        };
        for (i, job) in self.jobs.into_iter().enumerate() {
            if self.pending.contains(&i) {
                report.failed.push(job);
            } else {
                report.succeeded.push(job);
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::MediaKind;

    fn jobs(names: &[&str]) -> Vec<JobDescriptor> {
        names
            .iter()
            .map(|n| JobDescriptor::new(MediaKind::Audio, format!("https://x/{n}"), *n).unwrap())
            .collect()
    }

    fn failing(jobs: &[JobDescriptor], names: &[&str]) -> Verification {
        let failed: Vec<JobDescriptor> = jobs
            .iter()
            .filter(|j| names.contains(&j.requested_name()))
            .cloned()
            .collect();
        let succeeded = jobs.iter().filter(|j| !failed.contains(j)).cloned().collect();
        Verification {
            succeeded,
            failed,
            ..Verification::default()
        }
    }

    #[test]
    fn all_succeed_in_first_round() {
        let all = jobs(&["a", "b"]);
        let mut c = RetryController::new(all.clone(), 4);
        assert_eq!(c.state(), RoundState::Round(1));
        assert_eq!(c.record(&failing(&all, &[])), RoundState::Done);
        let report = c.into_report();
        assert!(report.is_complete());
        assert_eq!(report.rounds.len(), 1);
        assert_eq!(report.succeeded, all);
    }

    #[test]
    fn stops_at_ceiling_with_permanent_failure() {
        let all = jobs(&["a", "b", "c"]);
        let mut c = RetryController::new(all.clone(), 4);
        for n in 1..=3 {
            assert_eq!(c.record(&failing(&all, &["b"])), RoundState::Round(n + 1));
            assert_eq!(c.pending(), vec![all[1].clone()]);
        }
        assert_eq!(c.record(&failing(&all, &["b"])), RoundState::Done);
        assert_eq!(c.round(), 4);
        assert!(c.pending().is_empty());

        let report = c.into_report();
        assert_eq!(report.failed, vec![all[1].clone()]);
        assert_eq!(report.succeeded, vec![all[0].clone(), all[2].clone()]);
        let attempted: Vec<usize> = report.rounds.iter().map(|r| r.attempted).collect();
        assert_eq!(attempted, [3, 1, 1, 1]);
    }

    #[test]
    fn failure_set_never_grows() {
        let all = jobs(&["a", "b", "c"]);
        let mut c = RetryController::new(all.clone(), 4);
        c.record(&failing(&all, &["b"]));
        assert_eq!(c.pending_len(), 1);
        // A job that succeeded earlier reported failing again stays succeeded.
        c.record(&failing(&all, &["a", "b", "c"]));
        assert_eq!(c.pending_len(), 1);
        let report = c.into_report();
        assert!(report.rounds.windows(2).all(|w| w[1].failed <= w[0].failed));
    }

    #[test]
    fn single_round_ceiling() {
        let all = jobs(&["a"]);
        let mut c = RetryController::new(all.clone(), 0);
        assert_eq!(c.max_rounds(), 1);
        assert_eq!(c.record(&failing(&all, &["a"])), RoundState::Done);
        assert_eq!(c.into_report().failed.len(), 1);
    }

    #[test]
    fn claims_settle_only_for_verified_jobs() {
        let all = jobs(&["a", "b"]);
        let mut c = RetryController::new(all.clone(), 4);
        let mut v = failing(&all, &["a"]);
        v.claims = FileClaims::from([("a.mp3".to_string(), 0), ("b.mp3".to_string(), 1)]);
        c.record(&v);
        assert_eq!(
            c.settled_files(),
            &FileClaims::from([("b.mp3".to_string(), 1)])
        );

        // A later round cannot move a settled file to another job.
        let mut v = failing(&all, &[]);
        v.claims = FileClaims::from([("a.mp3".to_string(), 0), ("b.mp3".to_string(), 0)]);
        c.record(&v);
        assert_eq!(c.settled_files().get("b.mp3"), Some(&1));
        assert_eq!(c.settled_files().get("a.mp3"), Some(&0));
    }

    #[test]
    fn empty_batch_is_done() {
        let mut c = RetryController::new(Vec::new(), 4);
        assert_eq!(c.state(), RoundState::Done);
        assert_eq!(c.record(&Verification::default()), RoundState::Done);
        assert_eq!(c.round(), 0);
        assert_eq!(c.into_report().total(), 0);
    }
}
