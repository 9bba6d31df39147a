//! `ypd playlist` – expand a playlist and run it into its own sub-directory.

use anyhow::Result;
use std::sync::Arc;
use ypd_core::batch::{self, BatchOptions};
use ypd_core::config::YpdConfig;
use ypd_core::extractor::MediaExtractor;

use super::file::run_entries;
use crate::cli::RunStatus;

pub async fn run_playlist(
    url: &str,
    cfg: &YpdConfig,
    extractor: Arc<dyn MediaExtractor>,
) -> Result<RunStatus> {
    let options = BatchOptions::from_config(cfg);
    let playlist =
        batch::prepare_playlist(url, &cfg.output_dir, Arc::clone(&extractor), &options).await?;
    println!(
        "Playlist \"{}\": {} item(s) into {}",
        playlist.name,
        playlist.jobs.len(),
        playlist.output_dir.display()
    );
    if playlist.jobs.is_empty() {
        return Ok(RunStatus::Complete);
    }
    run_entries(playlist.jobs, &playlist.output_dir, cfg, extractor).await
}
