use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Retry round parameters (`[retry]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total rounds per batch, including the first.
    pub max_rounds: u32,
    /// Pause before each retry round, in seconds.
    #[serde(default)]
    pub delay_between_rounds_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_rounds: 4,
            delay_between_rounds_secs: 0.0,
        }
    }
}

impl RetryConfig {
    pub fn round_delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay_between_rounds_secs.max(0.0))
    }
}

/// External tool settings (`[extractor]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// yt-dlp executable (name on PATH or absolute path).
    pub ytdlp_path: String,
    /// ffmpeg executable used for thumbnail embedding.
    pub ffmpeg_path: String,
    /// Whole-request retries inside yt-dlp.
    pub network_retries: u32,
    /// Per-fragment retries inside yt-dlp.
    pub fragment_retries: u32,
    /// Fragments fetched concurrently for one download.
    pub concurrent_fragments: u32,
    /// Embed a square cover into audio downloaded from YouTube.
    pub embed_thumbnail: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: "yt-dlp".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            network_retries: 1,
            fragment_retries: 3,
            concurrent_fragments: 4,
            embed_thumbnail: true,
        }
    }
}

/// Global configuration loaded from `~/.config/ypd/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YpdConfig {
    /// Maximum download workers running at once.
    pub max_concurrency: usize,
    /// Root directory for downloaded media.
    pub output_dir: PathBuf,
    /// Browser profile to read authentication cookies from (None = no cookies).
    #[serde(default)]
    pub cookies_from_browser: Option<String>,
    /// Per-job timeout in seconds; a stalled worker is abandoned after this (None = wait forever).
    #[serde(default)]
    pub job_timeout_secs: Option<u64>,
    /// Delete files produced during the run that are not finished media.
    #[serde(default = "default_true")]
    pub cleanup_stray_files: bool,
    /// Write raw playlist/item metadata JSON under the state dir.
    #[serde(default = "default_true")]
    pub dump_metadata: bool,
    /// Directory for per-run log files (None = `~/.local/state/ypd/logs`).
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
}

fn default_true() -> bool {
    true
}

impl Default for YpdConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            output_dir: PathBuf::from("result"),
            cookies_from_browser: Some("firefox".to_string()),
            job_timeout_secs: None,
            cleanup_stray_files: true,
            dump_metadata: true,
            log_dir: None,
            retry: RetryConfig::default(),
            extractor: ExtractorConfig::default(),
        }
    }
}

impl YpdConfig {
    pub fn job_timeout(&self) -> Option<Duration> {
        self.job_timeout_secs.map(Duration::from_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("ypd")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Directory for diagnostic metadata dumps (`~/.local/state/ypd/metadata`).
pub fn metadata_dir() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("ypd")?;
    Ok(xdg_dirs.get_state_home().join("metadata"))
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<YpdConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = YpdConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: YpdConfig = toml::from_str(&data)?;
    Ok(cfg)
}
