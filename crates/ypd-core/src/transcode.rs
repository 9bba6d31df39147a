//! Transcoding collaborator: square cover art for audio files via ffmpeg.
//!
//! Failures here never fail the job; the audio file is left as it was.

use std::ffi::OsString;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::Duration;
use thiserror::Error;

/// Suffix of the intermediate file written while embedding a cover.
pub const TEMP_SUFFIX: &str = ".temp.mp3";

const THUMBNAIL_TIMEOUT: Duration = Duration::from_secs(12);

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("audio file not found: {0}")]
    MissingInput(PathBuf),
    #[error("thumbnail download failed: {0}")]
    Thumbnail(#[from] curl::Error),
    #[error("ffmpeg {step} failed with {status}")]
    Ffmpeg {
        step: &'static str,
        status: ExitStatus,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// `<audio path>.temp.mp3`
pub fn temp_output_path(audio: &Path) -> PathBuf {
    let mut name = audio.as_os_str().to_owned();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

/// ffmpeg arguments that center-crop an image to a square.
pub fn crop_args(input: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-y", "-loglevel", "quiet", "-i"]
        .iter()
        .map(OsString::from)
        .collect();
    args.push(input.into());
    for a in [
        "-vf",
        r"crop=min(iw\,ih):min(iw\,ih):(iw-ow)/2:(ih-oh)/2",
        "-update",
        "1",
    ] {
        args.push(a.into());
    }
    args.push(output.into());
    args
}

/// ffmpeg arguments that attach `cover` to `audio` as front cover, copying streams.
pub fn embed_args(cover: &Path, audio: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-y".into(), "-loglevel".into(), "quiet".into()];
    args.push("-i".into());
    args.push(cover.into());
    args.push("-i".into());
    args.push(audio.into());
    for a in [
        "-map",
        "0:v",
        "-map",
        "1:a",
        "-map_metadata",
        "1",
        "-c",
        "copy",
        "-disposition:v",
        "attached_pic",
        "-metadata:s:v",
        "title=Cover",
    ] {
        args.push(a.into());
    }
    args.push(output.into());
    args
}

/// Embeds square thumbnails into audio files.
#[derive(Debug, Clone)]
pub struct ThumbnailEmbedder {
    ffmpeg: String,
}

impl ThumbnailEmbedder {
    pub fn new(ffmpeg: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }

    /// Downloads `thumbnail_url`, crops it square, and replaces `audio` with a
    /// copy carrying the cover. On failure the temp output is removed.
    pub fn embed_square_cover(&self, audio: &Path, thumbnail_url: &str) -> Result<(), TranscodeError> {
        if !audio.is_file() {
            return Err(TranscodeError::MissingInput(audio.to_path_buf()));
        }

        let scratch = tempfile::tempdir()?;
        let original = scratch.path().join("thumb_original.jpg");
        let square = scratch.path().join("thumb_square.jpg");

        fetch_to_file(thumbnail_url, &original)?;
        self.ffmpeg("crop", &crop_args(&original, &square))?;

        let temp = temp_output_path(audio);
        if let Err(e) = self.ffmpeg("embed", &embed_args(&square, audio, &temp)) {
            let _ = std::fs::remove_file(&temp);
            return Err(e);
        }
        std::fs::rename(&temp, audio)?;
        tracing::info!(path = %audio.display(), "thumbnail embedded");
        Ok(())
    }

    fn ffmpeg(&self, step: &'static str, args: &[OsString]) -> Result<(), TranscodeError> {
        let status = Command::new(&self.ffmpeg)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        if !status.success() {
            return Err(TranscodeError::Ffmpeg { step, status });
        }
        Ok(())
    }
}

fn fetch_to_file(url: &str, dest: &Path) -> Result<(), TranscodeError> {
    let mut file = File::create(dest)?;
    let mut write_error: Option<std::io::Error> = None;

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.fail_on_error(true)?;
    easy.timeout(THUMBNAIL_TIMEOUT)?;
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match file.write_all(data) {
            Ok(()) => Ok(data.len()),
            Err(e) => {
                write_error = Some(e);
                Ok(0)
            }
        })?;
        let performed = transfer.perform();
        drop(transfer);
        if let Some(e) = write_error {
            return Err(e.into());
        }
        performed?;
    }
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_appends_suffix() {
        assert_eq!(
            temp_output_path(Path::new("result/01.Song.mp3")),
            PathBuf::from("result/01.Song.mp3.temp.mp3")
        );
    }

    #[test]
    fn embed_args_map_cover_and_audio() {
        let args = embed_args(
            Path::new("/tmp/c.jpg"),
            Path::new("a.mp3"),
            Path::new("a.mp3.temp.mp3"),
        );
        let args: Vec<String> = args
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        let first_input = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[first_input + 1], "/tmp/c.jpg");
        assert!(args.windows(2).any(|w| w[0] == "-disposition:v" && w[1] == "attached_pic"));
        assert_eq!(args.last().unwrap(), "a.mp3.temp.mp3");
    }

    #[test]
    fn crop_args_square_filter() {
        let args = crop_args(Path::new("in.jpg"), Path::new("out.jpg"));
        assert!(args
            .iter()
            .any(|a| a.to_string_lossy().starts_with("crop=min(iw")));
        assert_eq!(args.last().unwrap(), "out.jpg");
    }

    #[test]
    fn missing_audio_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = ThumbnailEmbedder::new("ffmpeg")
            .embed_square_cover(&dir.path().join("nope.mp3"), "http://127.0.0.1:9/x.jpg")
            .unwrap_err();
        assert!(matches!(err, TranscodeError::MissingInput(_)));
    }
}
