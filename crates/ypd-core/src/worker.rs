//! Download worker: performs one job end to end.
//!
//! A worker never reports success to anyone. Failures are logged and
//! swallowed; the verifier decides outcome from the output directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::extractor::{FetchOutcome, FetchRequest, MediaExtractor, Profile};
use crate::job::{JobDescriptor, MediaKind};
use crate::transcode::ThumbnailEmbedder;
use crate::url_model;

/// Output template suffix; the extractor fills in the real extension.
pub const EXT_PLACEHOLDER: &str = "%(ext)s";

/// Optional post-download steps.
#[derive(Debug, Clone, Default)]
pub struct WorkerOptions {
    /// Embed a square cover into audio from YouTube.
    pub thumbnails: Option<ThumbnailEmbedder>,
    /// Write the item's raw metadata JSON here.
    pub metadata_dir: Option<PathBuf>,
}

/// `<output_dir>/<sanitized name>.%(ext)s`
pub fn output_template(output_dir: &Path, job: &JobDescriptor) -> PathBuf {
    output_dir.join(format!("{}.{}", job.sanitized_name(), EXT_PLACEHOLDER))
}

pub fn fetch_request(job: &JobDescriptor, output_dir: &Path) -> FetchRequest {
    FetchRequest {
        url: job.source_url().to_string(),
        kind: job.kind(),
        output_template: output_template(output_dir, job),
        profile: Profile::for_kind(job.kind()),
    }
}

/// Runs one job. Blocks until the extractor returns; never panics on
/// extractor failure.
pub fn run(
    job: &JobDescriptor,
    output_dir: &Path,
    extractor: &dyn MediaExtractor,
    options: &WorkerOptions,
) {
    tracing::info!(job = %job.requested_name(), url = %job.source_url(), kind = %job.kind(), "download started");
    let request = fetch_request(job, output_dir);

    let outcome = match extractor.fetch(&request) {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!(job = %job.requested_name(), url = %job.source_url(), "download failed: {}", e);
            return;
        }
    };

    match &outcome.final_path {
        Some(path) => tracing::info!(job = %job.requested_name(), path = %path.display(), "download finished"),
        None => tracing::debug!(job = %job.requested_name(), "extractor did not report a final path"),
    }

    if let Some(dir) = &options.metadata_dir {
        if let Err(e) = dump_metadata(dir, job, &outcome) {
            tracing::debug!(job = %job.requested_name(), "could not write metadata dump: {}", e);
        }
    }

    if let Some(embedder) = &options.thumbnails {
        embed_cover(embedder, job, &outcome);
    }
}

/// Cover embedding applies to audio from YouTube with a known final path and
/// thumbnail URL. Failures leave the audio file as downloaded.
fn embed_cover(embedder: &ThumbnailEmbedder, job: &JobDescriptor, outcome: &FetchOutcome) {
    if job.kind() != MediaKind::Audio || !url_model::is_youtube(job.source_url()) {
        return;
    }
    let (Some(path), Some(thumbnail)) = (&outcome.final_path, &outcome.metadata.thumbnail) else {
        return;
    };
    if let Err(e) = embedder.embed_square_cover(path, thumbnail) {
        tracing::warn!(job = %job.requested_name(), "thumbnail embedding failed: {}", e);
    }
}

fn dump_metadata(dir: &Path, job: &JobDescriptor, outcome: &FetchOutcome) -> std::io::Result<()> {
    if outcome.raw.is_null() {
        return Ok(());
    }
    let base = outcome
        .metadata
        .id
        .as_deref()
        .map(url_model::sanitize)
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| job.sanitized_name());
    fs::create_dir_all(dir)?;
    let json = serde_json::to_string_pretty(&outcome.raw)?;
    fs::write(dir.join(format!("{base}.info.json")), json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{FetchError, MediaMetadata, PlaylistInfo};
    use std::sync::Mutex;

    struct Recording {
        requests: Mutex<Vec<FetchRequest>>,
        fail: bool,
    }

    impl MediaExtractor for Recording {
        fn resolve_playlist(&self, _url: &str) -> Result<PlaylistInfo, FetchError> {
            Ok(PlaylistInfo::default())
        }

        fn fetch(&self, request: &FetchRequest) -> Result<FetchOutcome, FetchError> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(FetchError::Io(std::io::Error::other("boom")));
            }
            Ok(FetchOutcome {
                final_path: None,
                metadata: MediaMetadata {
                    id: Some("abc".into()),
                    ..MediaMetadata::default()
                },
                raw: serde_json::json!({"id": "abc"}),
            })
        }
    }

    fn job(name: &str) -> JobDescriptor {
        JobDescriptor::new(MediaKind::Audio, "https://www.youtube.com/watch?v=1", name).unwrap()
    }

    #[test]
    fn template_uses_sanitized_name() {
        let t = output_template(Path::new("out"), &job("a/b: c"));
        assert_eq!(t, Path::new("out").join("a-b- c.%(ext)s"));
    }

    #[test]
    fn request_carries_profile_for_kind() {
        let req = fetch_request(&job("x"), Path::new("out"));
        assert_eq!(req.kind, MediaKind::Audio);
        assert_eq!(req.profile, Profile::for_kind(MediaKind::Audio));
        assert_eq!(req.url, "https://www.youtube.com/watch?v=1");
    }

    #[test]
    fn failure_is_swallowed() {
        let ext = Recording {
            requests: Mutex::new(Vec::new()),
            fail: true,
        };
        run(&job("x"), Path::new("out"), &ext, &WorkerOptions::default());
        assert_eq!(ext.requests.lock().unwrap().len(), 1);
    }

    #[test]
    fn missing_final_path_still_terminates_and_dumps_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let ext = Recording {
            requests: Mutex::new(Vec::new()),
            fail: false,
        };
        let opts = WorkerOptions {
            thumbnails: Some(ThumbnailEmbedder::new("ffmpeg")),
            metadata_dir: Some(dir.path().join("meta")),
        };
        run(&job("x"), dir.path(), &ext, &opts);
        let dumped = fs::read_to_string(dir.path().join("meta").join("abc.info.json")).unwrap();
        assert!(dumped.contains("\"abc\""));
    }
}
