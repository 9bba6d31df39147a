//! Per-kind stream selection and post-processing profiles.

use crate::job::MediaKind;

/// Best audio stream, any container.
pub const AUDIO_FORMAT: &str = "bestaudio/best";

/// Best mp4 video + m4a audio pair, or a single mp4 stream.
pub const VIDEO_FORMAT: &str = "bv*[ext=mp4]+ba[ext=m4a]/b[ext=mp4]";

pub const AUDIO_BITRATE_KBPS: u32 = 320;

/// What happens to the fetched streams after transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostProcess {
    /// Transcode the audio track to `codec` at `bitrate_kbps`.
    ExtractAudio { codec: &'static str, bitrate_kbps: u32 },
    /// Remux the streams into `container` without re-encoding.
    Remux { container: &'static str },
}

/// Stream selection plus post-processing for one media kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    pub format: &'static str,
    pub post: PostProcess,
    /// Write title/uploader tags into the container.
    pub embed_metadata: bool,
}

impl Profile {
    pub fn for_kind(kind: MediaKind) -> Self {
        let post = match kind {
            MediaKind::Audio => PostProcess::ExtractAudio {
                codec: MediaKind::Audio.extension(),
                bitrate_kbps: AUDIO_BITRATE_KBPS,
            },
            MediaKind::Video => PostProcess::Remux {
                container: MediaKind::Video.extension(),
            },
        };
        let format = match kind {
            MediaKind::Audio => AUDIO_FORMAT,
            MediaKind::Video => VIDEO_FORMAT,
        };
        Self {
            format,
            post,
            embed_metadata: true,
        }
    }

    /// Extension of the file this profile produces.
    pub fn output_extension(&self) -> &'static str {
        match self.post {
            PostProcess::ExtractAudio { codec, .. } => codec,
            PostProcess::Remux { container } => container,
        }
    }
}
