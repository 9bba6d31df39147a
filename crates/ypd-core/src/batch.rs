//! Batch runner: rounds of scheduling and verification until the retry
//! controller is done.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::config::{self, YpdConfig};
use crate::extractor::MediaExtractor;
use crate::job::{self, JobDescriptor};
use crate::playlist;
use crate::retry::{BatchReport, RetryController, RoundState};
use crate::scheduler::{self, PoolOptions};
use crate::transcode::ThumbnailEmbedder;
use crate::url_model;
use crate::verify;
use crate::worker::WorkerOptions;

/// File modification times come from a coarse kernel clock that can trail
/// `SystemTime::now()`; the batch start is moved back by this much.
pub const CLOCK_SLACK: Duration = Duration::from_millis(50);

/// Raw playlist listing dump name.
pub const PLAYLIST_DUMP: &str = "playlist.json";

/// Everything a batch needs besides the jobs themselves.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub pool: PoolOptions,
    /// Total rounds including the first.
    pub max_rounds: u32,
    /// Pause before each retry round.
    pub round_delay: Duration,
    /// Delete intermediate files during verification.
    pub cleanup: bool,
    /// Where raw playlist listings are dumped (None = no dumps).
    pub metadata_dir: Option<PathBuf>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            pool: PoolOptions::default(),
            max_rounds: 4,
            round_delay: Duration::ZERO,
            cleanup: true,
            metadata_dir: None,
        }
    }
}

impl BatchOptions {
    pub fn from_config(cfg: &YpdConfig) -> Self {
        let metadata_dir = if cfg.dump_metadata {
            match config::metadata_dir() {
                Ok(dir) => Some(dir),
                Err(e) => {
                    tracing::warn!("metadata dumps disabled: {:#}", e);
                    None
                }
            }
        } else {
            None
        };
        let thumbnails = cfg
            .extractor
            .embed_thumbnail
            .then(|| ThumbnailEmbedder::new(cfg.extractor.ffmpeg_path.clone()));

        Self {
            pool: PoolOptions {
                max_concurrency: cfg.max_concurrency,
                job_timeout: cfg.job_timeout(),
                worker: WorkerOptions {
                    thumbnails,
                    metadata_dir: metadata_dir.clone(),
                },
            },
            max_rounds: cfg.retry.max_rounds,
            round_delay: cfg.retry.round_delay(),
            cleanup: cfg.cleanup_stray_files,
            metadata_dir,
        }
    }
}

/// Timestamp after which produced files count for this batch.
pub fn batch_start() -> SystemTime {
    let now = SystemTime::now();
    now.checked_sub(CLOCK_SLACK).unwrap_or(now)
}

/// Runs `jobs` into `output_dir` until every job is verified or the round
/// ceiling is reached. Round `n + 1` starts only after round `n` is verified.
pub async fn run_batch(
    jobs: Vec<JobDescriptor>,
    output_dir: &Path,
    extractor: Arc<dyn MediaExtractor>,
    options: &BatchOptions,
) -> Result<BatchReport> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("create output dir: {}", output_dir.display()))?;
    let since = batch_start();
    let mut controller = RetryController::new(jobs, options.max_rounds);
    tracing::info!(
        jobs = controller.jobs().len(),
        max_rounds = controller.max_rounds(),
        dir = %output_dir.display(),
        "batch started"
    );

    while let RoundState::Round(round) = controller.state() {
        if round > 1 && !options.round_delay.is_zero() {
            tokio::time::sleep(options.round_delay).await;
        }
        let pending = controller.pending();
        tracing::info!(round, jobs = pending.len(), "round started");
        scheduler::run_all(&pending, output_dir, Arc::clone(&extractor), &options.pool).await;

        let verification = tokio::task::spawn_blocking({
            let output_dir = output_dir.to_path_buf();
            let all = controller.jobs().to_vec();
            let cleanup = options.cleanup;
            let settled = controller.settled_files().clone();
            move || verify::verify_with_claims(&output_dir, &all, since, cleanup, &settled)
        })
        .await
        .context("verify task join")?
        .with_context(|| format!("verify output dir: {}", output_dir.display()))?;

        for job in &verification.failed {
            tracing::debug!(round, job = %job.requested_name(), "not produced");
        }
        controller.record(&verification);
    }

    let report = controller.into_report();
    tracing::info!(
        succeeded = report.succeeded.len(),
        failed = report.failed.len(),
        rounds = report.rounds.len(),
        "batch finished"
    );
    Ok(report)
}

/// Runs one job once, with no retry rounds. Returns true when at least one
/// finished media file appeared in `output_dir` meanwhile.
pub async fn run_single(
    job: JobDescriptor,
    output_dir: &Path,
    extractor: Arc<dyn MediaExtractor>,
    options: &BatchOptions,
) -> Result<bool> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("create output dir: {}", output_dir.display()))?;
    let since = batch_start();
    let pool = PoolOptions {
        max_concurrency: 1,
        ..options.pool.clone()
    };
    scheduler::run_all(std::slice::from_ref(&job), output_dir, extractor, &pool).await;

    let produced = verify::produced_media_since(output_dir, since)
        .with_context(|| format!("scan output dir: {}", output_dir.display()))?;
    for path in &produced {
        tracing::info!(job = %job.requested_name(), path = %path.display(), "produced");
    }
    Ok(!produced.is_empty())
}

/// Jobs of an expanded playlist and the sub-directory they go to.
#[derive(Debug, Clone)]
pub struct PlaylistBatch {
    pub name: String,
    pub output_dir: PathBuf,
    pub jobs: Vec<JobDescriptor>,
}

/// Expands `url` and places its jobs under `output_root/<sanitized name>`.
/// The raw listing is dumped when `options.metadata_dir` is set.
pub async fn prepare_playlist(
    url: &str,
    output_root: &Path,
    extractor: Arc<dyn MediaExtractor>,
    options: &BatchOptions,
) -> Result<PlaylistBatch> {
    let expanded = tokio::task::spawn_blocking({
        let url = url.to_string();
        move || playlist::expand(extractor.as_ref(), &url)
    })
    .await
    .context("playlist task join")?
    .with_context(|| format!("resolve playlist: {}", url))?;

    if let Some(dir) = &options.metadata_dir {
        if let Err(e) = dump_json(dir, PLAYLIST_DUMP, &expanded.info.raw) {
            tracing::debug!("could not write playlist dump: {:#}", e);
        }
    }

    let mut dir_name = url_model::sanitize(&expanded.name);
    if dir_name.is_empty() {
        dir_name = playlist::fallback_name();
    }
    Ok(PlaylistBatch {
        output_dir: output_root.join(dir_name),
        name: expanded.name,
        jobs: expanded.jobs,
    })
}

/// Reads an entries file. Malformed lines are skipped with a warning.
pub fn load_entries(path: &Path) -> Result<Vec<JobDescriptor>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read entries file: {}", path.display()))?;
    Ok(job::parse_items_lenient(text.lines()))
}

/// Writes the commented entries template to `path` unless it already exists.
/// Returns false when the file was left untouched.
pub fn write_input_template(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, job::INPUT_TEMPLATE)
        .with_context(|| format!("write template: {}", path.display()))?;
    Ok(true)
}

fn dump_json(dir: &Path, name: &str, value: &serde_json::Value) -> Result<()> {
    if value.is_null() {
        return Ok(());
    }
    fs::create_dir_all(dir)?;
    fs::write(dir.join(name), serde_json::to_string_pretty(value)?)?;
    Ok(())
}
