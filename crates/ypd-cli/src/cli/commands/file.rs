//! `ypd file` – run every entry of an entries file as one batch.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use ypd_core::batch::{self, BatchOptions};
use ypd_core::config::YpdConfig;
use ypd_core::extractor::MediaExtractor;
use ypd_core::job::{JobDescriptor, DEFAULT_INPUT_FILE};

use crate::cli::summary;
use crate::cli::RunStatus;

pub async fn run_file(
    path: Option<&Path>,
    cfg: &YpdConfig,
    extractor: Arc<dyn MediaExtractor>,
) -> Result<RunStatus> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_FILE));
    let jobs = batch::load_entries(&path)?;
    if jobs.is_empty() {
        println!("No entries in {}.", path.display());
        return Ok(RunStatus::Complete);
    }
    tracing::info!(entries = jobs.len(), file = %path.display(), "entries loaded");
    run_entries(jobs, &cfg.output_dir, cfg, extractor).await
}

/// Runs `jobs` as a batch into `output_dir` and prints the summary.
pub async fn run_entries(
    jobs: Vec<JobDescriptor>,
    output_dir: &Path,
    cfg: &YpdConfig,
    extractor: Arc<dyn MediaExtractor>,
) -> Result<RunStatus> {
    let options = BatchOptions::from_config(cfg);
    let report = batch::run_batch(jobs, output_dir, extractor, &options).await?;
    summary::print_report(&report, output_dir);
    Ok(if report.is_complete() {
        RunStatus::Complete
    } else {
        RunStatus::Incomplete
    })
}
