//! CLI for the YPD playlist downloader.

mod commands;
mod summary;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use ypd_core::config::{self, YpdConfig};
use ypd_core::extractor::{MediaExtractor, YtDlp};
use ypd_core::logging;

use commands::{run_completions, run_file, run_get, run_init, run_playlist};

/// Top-level CLI for the YPD playlist downloader.
#[derive(Debug, Parser)]
#[command(name = "ypd")]
#[command(about = "YPD: batch audio/video downloader with verified retry rounds", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Per-run overrides of `config.toml`.
#[derive(Debug, Default, Args)]
pub struct Overrides {
    /// Run up to N downloads at once.
    #[arg(long, global = true, value_name = "N")]
    pub jobs: Option<usize>,

    /// Directory for downloaded media.
    #[arg(long, global = true, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Total verification rounds, including the first.
    #[arg(long, global = true, value_name = "N")]
    pub rounds: Option<u32>,

    /// Do not read cookies from a browser profile.
    #[arg(long, global = true)]
    pub no_cookies: bool,

    /// Abandon a download after this many seconds.
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl Overrides {
    pub fn apply(&self, cfg: &mut YpdConfig) {
        if let Some(n) = self.jobs {
            cfg.max_concurrency = n.max(1);
        }
        if let Some(dir) = &self.output_dir {
            cfg.output_dir = dir.clone();
        }
        if let Some(n) = self.rounds {
            cfg.retry.max_rounds = n.max(1);
        }
        if self.no_cookies {
            cfg.cookies_from_browser = None;
        }
        if let Some(secs) = self.timeout {
            cfg.job_timeout_secs = Some(secs);
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download one entry, a bare URL, a playlist URL, or `file` for input.txt.
    Get {
        /// `kind ; url ; name`, a URL, a playlist URL, or `file`. Prompted for when omitted.
        input: Option<String>,
    },

    /// Download every entry of an entries file.
    File {
        /// Entries file (default: input.txt).
        path: Option<PathBuf>,
    },

    /// Download every item of a playlist into its own sub-directory.
    Playlist {
        /// Playlist URL.
        url: String,
    },

    /// Write a commented entries template.
    Init {
        /// Target file (default: input.txt).
        path: Option<PathBuf>,
    },

    /// Print shell completions.
    Completions {
        /// Target shell.
        shell: clap_complete::Shell,
    },
}

/// How a run ended; mapped to the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every job verified.
    Complete,
    /// Finished with permanently failed jobs.
    Incomplete,
}

impl RunStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Complete => 0,
            RunStatus::Incomplete => 2,
        }
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<RunStatus> {
        let cli = Cli::parse();

        // Neither writes log files nor needs the config.
        match &cli.command {
            CliCommand::Completions { shell } => {
                run_completions(*shell);
                return Ok(RunStatus::Complete);
            }
            CliCommand::Init { path } => {
                run_init(path.as_deref())?;
                return Ok(RunStatus::Complete);
            }
            _ => {}
        }

        let mut cfg = config::load_or_init()?;
        cli.overrides.apply(&mut cfg);
        let log_path = match logging::init_logging(cfg.log_dir.as_deref()) {
            Ok(path) => Some(path),
            Err(e) => {
                logging::init_logging_stderr();
                tracing::warn!("file logging unavailable: {:#}", e);
                None
            }
        };
        tracing::debug!("loaded config: {:?}", cfg);

        let extractor: Arc<dyn MediaExtractor> = Arc::new(YtDlp::from_config(&cfg));
        let status = match cli.command {
            CliCommand::Get { input } => run_get(input, &cfg, extractor).await,
            CliCommand::File { path } => run_file(path.as_deref(), &cfg, extractor).await,
            CliCommand::Playlist { url } => run_playlist(&url, &cfg, extractor).await,
            CliCommand::Init { .. } | CliCommand::Completions { .. } => Ok(RunStatus::Complete),
        };

        if let Some(path) = &log_path {
            println!("Logs were saved to {}", path.display());
        }
        status
    }
}

#[cfg(test)]
mod tests;
