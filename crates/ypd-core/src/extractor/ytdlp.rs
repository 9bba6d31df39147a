//! [`MediaExtractor`] backed by the `yt-dlp` executable.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use super::process::{run_with_timeout, tail_lines};
use super::{
    FetchError, FetchOutcome, FetchRequest, MediaExtractor, MediaMetadata, PlaylistInfo,
    PostProcess,
};
use crate::config::YpdConfig;

/// `--print` template emitting one JSON object once the file is in its final place.
pub const PRINT_TEMPLATE: &str =
    "after_move:%(.{filepath,id,title,thumbnail,webpage_url,extractor_key})j";

const STDERR_TAIL_LINES: usize = 5;

/// yt-dlp invocation settings.
#[derive(Debug, Clone)]
pub struct YtDlp {
    pub program: String,
    /// Passed as `--ffmpeg-location` when set.
    pub ffmpeg_location: Option<String>,
    pub cookies_from_browser: Option<String>,
    pub network_retries: u32,
    pub fragment_retries: u32,
    pub concurrent_fragments: u32,
    /// Kill the yt-dlp process after this long.
    pub timeout: Option<Duration>,
}

impl YtDlp {
    pub fn from_config(cfg: &YpdConfig) -> Self {
        let ext = &cfg.extractor;
        Self {
            program: ext.ytdlp_path.clone(),
            ffmpeg_location: (ext.ffmpeg_path != "ffmpeg").then(|| ext.ffmpeg_path.clone()),
            cookies_from_browser: cfg.cookies_from_browser.clone(),
            network_retries: ext.network_retries,
            fragment_retries: ext.fragment_retries,
            concurrent_fragments: ext.concurrent_fragments,
            timeout: cfg.job_timeout(),
        }
    }

    fn push_cookies(&self, args: &mut Vec<String>) {
        if let Some(browser) = &self.cookies_from_browser {
            args.push("--cookies-from-browser".into());
            args.push(browser.clone());
        }
    }

    /// Arguments for a flat playlist listing as one JSON document.
    pub fn playlist_args(&self, url: &str) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "--flat-playlist".into(),
            "--dump-single-json".into(),
            "--no-warnings".into(),
        ];
        self.push_cookies(&mut args);
        args.push(url.to_string());
        args
    }

    /// Arguments for one download with its profile.
    pub fn download_args(&self, req: &FetchRequest) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "--no-playlist".into(),
            "--no-warnings".into(),
            "--no-progress".into(),
            "--no-simulate".into(),
            "-f".into(),
            req.profile.format.into(),
            "-o".into(),
            req.output_template.to_string_lossy().into_owned(),
            "--retries".into(),
            self.network_retries.to_string(),
            "--fragment-retries".into(),
            self.fragment_retries.to_string(),
            "--concurrent-fragments".into(),
            self.concurrent_fragments.to_string(),
        ];
        self.push_cookies(&mut args);
        if let Some(ffmpeg) = &self.ffmpeg_location {
            args.push("--ffmpeg-location".into());
            args.push(ffmpeg.clone());
        }

        match req.profile.post {
            PostProcess::ExtractAudio {
                codec,
                bitrate_kbps,
            } => {
                args.push("--extract-audio".into());
                args.push("--audio-format".into());
                args.push(codec.into());
                args.push("--audio-quality".into());
                args.push(format!("{bitrate_kbps}K"));
            }
            PostProcess::Remux { container } => {
                args.push("--remux-video".into());
                args.push(container.into());
            }
        }
        if req.profile.embed_metadata {
            args.push("--embed-metadata".into());
        }

        args.push("--print".into());
        args.push(PRINT_TEMPLATE.into());
        args.push(req.url.clone());
        args
    }

    fn run(&self, args: &[String], timeout: Option<Duration>) -> Result<String, FetchError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        tracing::debug!(program = %self.program, ?args, "running extractor");
        let out = run_with_timeout(&mut cmd, timeout)?;
        if !out.status.success() {
            return Err(FetchError::Exit {
                program: self.program.clone(),
                status: out.status,
                stderr: tail_lines(&out.stderr, STDERR_TAIL_LINES),
            });
        }
        Ok(out.stdout)
    }
}

/// Picks the last JSON object line printed by `--print`.
pub(crate) fn parse_print_output(stdout: &str) -> Result<FetchOutcome, FetchError> {
    let Some(line) = stdout
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| l.starts_with('{'))
    else {
        return Ok(FetchOutcome::default());
    };
    let raw: serde_json::Value = serde_json::from_str(line)?;
    let metadata: MediaMetadata = serde_json::from_value(raw.clone())?;
    Ok(FetchOutcome {
        final_path: metadata.final_path.clone().filter(|p| *p != PathBuf::new()),
        metadata,
        raw,
    })
}

impl MediaExtractor for YtDlp {
    fn resolve_playlist(&self, url: &str) -> Result<PlaylistInfo, FetchError> {
        let stdout = self.run(&self.playlist_args(url), self.timeout)?;
        PlaylistInfo::from_json(&stdout)
    }

    fn fetch(&self, request: &FetchRequest) -> Result<FetchOutcome, FetchError> {
        let stdout = self.run(&self.download_args(request), self.timeout)?;
        parse_print_output(&stdout)
    }
}
