//! Bounded worker pool on a Tokio `JoinSet`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;

use crate::extractor::MediaExtractor;
use crate::job::JobDescriptor;
use crate::worker::{self, WorkerOptions};

use super::progress::PoolReport;

/// Pool parameters for one round.
#[derive(Debug, Clone)]
pub struct PoolOptions {
    /// Upper bound on workers running at once (values below 1 act as 1).
    pub max_concurrency: usize,
    /// Abandon a worker that runs longer than this.
    pub job_timeout: Option<Duration>,
    pub worker: WorkerOptions,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            job_timeout: None,
            worker: WorkerOptions::default(),
        }
    }
}

enum WorkerEnd {
    Finished,
    TimedOut,
    Panicked(String),
}

/// Runs every job once with up to `max_concurrency` workers in flight.
/// When one finishes, the next job in input order is started. Blocking
/// extractor calls run on Tokio's blocking pool.
///
/// A worker that exceeds `job_timeout` no longer holds a slot; its thread is
/// left to finish on its own and whatever it produces is judged by the
/// verifier like any other file.
pub async fn run_all(
    jobs: &[JobDescriptor],
    output_dir: &Path,
    extractor: Arc<dyn MediaExtractor>,
    options: &PoolOptions,
) -> PoolReport {
    let max_concurrency = options.max_concurrency.max(1);
    let output_dir: Arc<PathBuf> = Arc::new(output_dir.to_path_buf());
    let worker_options = Arc::new(options.worker.clone());

    let mut report = PoolReport::default();
    let mut queue = jobs.iter().enumerate();
    let mut join_set = JoinSet::new();

    loop {
        while join_set.len() < max_concurrency {
            let Some((index, job)) = queue.next() else {
                break;
            };
            report.started += 1;
            let job = job.clone();
            let output_dir = Arc::clone(&output_dir);
            let extractor = Arc::clone(&extractor);
            let worker_options = Arc::clone(&worker_options);
            let timeout = options.job_timeout;
            join_set.spawn(async move {
                let handle = tokio::task::spawn_blocking(move || {
                    worker::run(&job, &output_dir, extractor.as_ref(), &worker_options)
                });
                let joined = match timeout {
                    Some(limit) => match tokio::time::timeout(limit, handle).await {
                        Ok(joined) => joined,
                        Err(_) => return (index, WorkerEnd::TimedOut),
                    },
                    None => handle.await,
                };
                match joined {
                    Ok(()) => (index, WorkerEnd::Finished),
                    Err(e) => (index, WorkerEnd::Panicked(e.to_string())),
                }
            });
        }

        if join_set.is_empty() {
            break;
        }

        let Some(res) = join_set.join_next().await else {
            break;
        };
        match res {
            Ok((_, WorkerEnd::Finished)) => report.finished += 1,
            Ok((index, WorkerEnd::TimedOut)) => {
                let job = &jobs[index];
                tracing::warn!(job = %job.requested_name(), "worker timed out; abandoning");
                report.abandoned.push(job.clone());
            }
            Ok((index, WorkerEnd::Panicked(msg))) => {
                let job = &jobs[index];
                tracing::error!(job = %job.requested_name(), "worker panicked: {}", msg);
                report.crashed.push(job.clone());
            }
            Err(e) => tracing::error!("worker task join: {}", e),
        }
    }

    tracing::debug!(
        started = report.started,
        finished = report.finished,
        unfinished = report.unfinished(),
        "round workers done"
    );
    report
}
