//! Extraction/download collaborator interface.
//!
//! The batch engine only depends on [`MediaExtractor`]; it never knows how a
//! URL is resolved to streams or how transfer and transcoding happen.
//! [`YtDlp`] is the production implementation.

mod process;
mod profile;
mod ytdlp;

pub use process::{run_with_timeout, CommandOutput};
pub use profile::{PostProcess, Profile, AUDIO_BITRATE_KBPS, AUDIO_FORMAT, VIDEO_FORMAT};
pub use ytdlp::{YtDlp, PRINT_TEMPLATE};

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::job::MediaKind;
use crate::url_model;

/// Failure reported by the extractor during resolution or transfer.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("{program} timed out after {}s", .timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },
    #[error("unreadable extractor metadata: {0}")]
    Metadata(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One download handed to the extractor.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub kind: MediaKind,
    /// Output path template, `<dir>/<sanitized name>.%(ext)s`.
    pub output_template: PathBuf,
    pub profile: Profile,
}

/// Metadata the worker needs after a download.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaMetadata {
    /// Final on-disk path after post-processing.
    #[serde(default, rename = "filepath")]
    pub final_path: Option<PathBuf>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub webpage_url: Option<String>,
    #[serde(default)]
    pub extractor_key: Option<String>,
}

/// Result of a successful fetch. `final_path` is `None` when the extractor
/// did not report where the file landed; the verifier still decides success.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    pub final_path: Option<PathBuf>,
    pub metadata: MediaMetadata,
    /// Raw JSON as reported, kept for diagnostic dumps.
    pub raw: serde_json::Value,
}

/// One entry of a flat playlist listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistEntry {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl PlaylistEntry {
    /// Sub-URL, if present and non-blank.
    pub fn source_url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    pub fn is_music_domain(&self) -> bool {
        self.source_url().is_some_and(url_model::is_music_domain)
    }
}

/// Ordered playlist listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaylistInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub entries: Vec<PlaylistEntry>,
    #[serde(skip)]
    pub raw: serde_json::Value,
}

impl PlaylistInfo {
    /// Parses a single-JSON playlist dump, keeping the raw document.
    pub fn from_json(json: &str) -> Result<Self, FetchError> {
        let raw: serde_json::Value = serde_json::from_str(json)?;
        let mut info: PlaylistInfo = serde_json::from_value(raw.clone())?;
        info.raw = raw;
        Ok(info)
    }
}

/// Resolves playlists and performs downloads. Calls block; the scheduler
/// runs them on blocking worker threads.
pub trait MediaExtractor: Send + Sync {
    fn resolve_playlist(&self, url: &str) -> Result<PlaylistInfo, FetchError>;

    fn fetch(&self, request: &FetchRequest) -> Result<FetchOutcome, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playlist_info_from_json() {
        let json = r#"{
            "title": "Road trip",
            "entries": [
                {"url": "https://music.youtube.com/watch?v=a", "title": "A"},
                {"title": "private video"},
                {"url": "https://www.youtube.com/watch?v=c"}
            ]
        }"#;
        let info = PlaylistInfo::from_json(json).unwrap();
        assert_eq!(info.title.as_deref(), Some("Road trip"));
        assert_eq!(info.entries.len(), 3);
        assert!(info.entries[0].is_music_domain());
        assert!(info.entries[1].source_url().is_none());
        assert!(!info.entries[2].is_music_domain());
        assert_eq!(info.raw["title"], "Road trip");
    }

    #[test]
    fn playlist_info_without_entries() {
        let info = PlaylistInfo::from_json("{}").unwrap();
        assert!(info.title.is_none());
        assert!(info.entries.is_empty());
    }

    #[test]
    fn blank_entry_url_is_missing() {
        let entry = PlaylistEntry {
            url: Some("  ".to_string()),
            title: None,
        };
        assert!(entry.source_url().is_none());
        assert!(!entry.is_music_domain());
    }
}
