//! Job descriptors: one intent to fetch and convert one remote asset.
//!
//! Descriptors are created by the item parser or the playlist expander and
//! are never mutated afterwards; workers and the verifier only read them.

mod input;
mod parse;
mod placeholder;

pub use input::{classify_input, BatchInput, DEFAULT_INPUT_FILE, FILE_SENTINEL, INPUT_TEMPLATE};
pub use parse::{parse_items, parse_items_lenient, parse_line, ParseError, ParseErrorKind};
pub use placeholder::{NamePattern, TITLE_PLACEHOLDER};

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::url_model;

/// Target media kind; selects container/codec and the extractor profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    /// Extension of the file a successful job leaves in the output directory.
    pub const fn extension(self) -> &'static str {
        match self {
            MediaKind::Audio => "mp3",
            MediaKind::Video => "mp4",
        }
    }

    /// Kind for a bare URL: music-domain links become audio, everything else video.
    pub fn for_url(url: &str) -> Self {
        if url_model::is_music_domain(url) {
            MediaKind::Audio
        } else {
            MediaKind::Video
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MediaKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "audio" => Ok(MediaKind::Audio),
            "video" => Ok(MediaKind::Video),
            _ => Err(()),
        }
    }
}

/// Unit of work: media kind, source locator, requested display name.
///
/// `requested_name` may contain [`TITLE_PLACEHOLDER`], substituted by the
/// extractor at fetch time. Fields are private so a descriptor cannot change
/// after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobDescriptor {
    kind: MediaKind,
    source_url: String,
    requested_name: String,
}

impl JobDescriptor {
    /// Creates a descriptor. Returns `None` when `source_url` is empty.
    ///
    /// Instagram reels have no usable title, so a title placeholder in their
    /// name is replaced with `reel-<unix millis>` here, once.
    pub fn new(
        kind: MediaKind,
        source_url: impl Into<String>,
        requested_name: impl Into<String>,
    ) -> Option<Self> {
        let source_url = source_url.into().trim().to_string();
        if source_url.is_empty() {
            return None;
        }
        let mut requested_name = requested_name.into().trim().to_string();
        if url_model::is_instagram_reel(&source_url) && requested_name.contains(TITLE_PLACEHOLDER)
        {
            let millis = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default();
            requested_name = requested_name.replace(TITLE_PLACEHOLDER, &format!("reel-{millis}"));
        }
        Some(Self {
            kind,
            source_url,
            requested_name,
        })
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn requested_name(&self) -> &str {
        &self.requested_name
    }

    /// Filesystem-safe form of the requested name.
    pub fn sanitized_name(&self) -> String {
        url_model::sanitize(&self.requested_name)
    }

    /// Matching key: the sanitized name before its first dot.
    pub fn stem(&self) -> String {
        url_model::stem(&self.sanitized_name()).to_string()
    }

    /// Renders the descriptor as an input-file line (`kind ; url ; name`).
    pub fn to_line(&self) -> String {
        format!("{} ; {} ; {}", self.kind, self.source_url, self.requested_name)
    }
}

impl fmt::Display for JobDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.requested_name, self.source_url)
    }
}
