//! `ypd get` – classify one input and run it.

use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use ypd_core::batch::{self, BatchOptions};
use ypd_core::config::YpdConfig;
use ypd_core::extractor::MediaExtractor;
use ypd_core::job::{classify_input, BatchInput, JobDescriptor};

use super::{run_file, run_playlist};
use crate::cli::RunStatus;

const PROMPT: &str = "Entry (kind ; url ; name), URL, playlist URL, or 'file': ";

const ACCEPTED_INPUTS: &str = "\
Accepted inputs:
  audio ; https://www.youtube.com/watch?v=ID ; name %(title)s   one entry
  https://www.youtube.com/watch?v=ID                             bare URL, named by its title
  https://www.youtube.com/playlist?list=ID                       every item of a playlist
  file                                                           entries from input.txt
";

pub async fn run_get(
    input: Option<String>,
    cfg: &YpdConfig,
    extractor: Arc<dyn MediaExtractor>,
) -> Result<RunStatus> {
    let raw = match input {
        Some(raw) => raw,
        None => prompt_line(&mut io::stdin().lock(), &mut io::stdout())?,
    };

    let input = match classify_input(&raw) {
        Ok(input) => input,
        Err(e) => {
            eprint!("{}", ACCEPTED_INPUTS);
            return Err(e).context("invalid input");
        }
    };
    match input {
        BatchInput::Entry(job) => run_one(job, cfg, extractor).await,
        BatchInput::Playlist(url) => run_playlist(&url, cfg, extractor).await,
        BatchInput::File(path) => run_file(Some(path.as_path()), cfg, extractor).await,
    }
}

/// Single-entry mode: one attempt, no retry rounds.
async fn run_one(
    job: JobDescriptor,
    cfg: &YpdConfig,
    extractor: Arc<dyn MediaExtractor>,
) -> Result<RunStatus> {
    let options = BatchOptions::from_config(cfg);
    let name = job.requested_name().to_string();
    if batch::run_single(job, &cfg.output_dir, extractor, &options).await? {
        println!("Downloaded {} into {}", name, cfg.output_dir.display());
        Ok(RunStatus::Complete)
    } else {
        println!("Failed to download {}", name);
        Ok(RunStatus::Incomplete)
    }
}

fn prompt_line<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<String> {
    write!(output, "{}", PROMPT)?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        anyhow::bail!("no input given");
    }
    Ok(line.trim().to_string())
}
