//! Playlist expander: one playlist URL into numbered job descriptors.

use chrono::Local;

use crate::extractor::{FetchError, MediaExtractor, PlaylistInfo};
use crate::job::{JobDescriptor, MediaKind, TITLE_PLACEHOLDER};

/// `strftime` pattern of the fallback name for untitled playlists.
pub const FALLBACK_NAME_FORMAT: &str = "Playlist-%Y-%m-%d_%H-%M-%S";

/// Separator between the position number and the title placeholder.
pub const NUMBER_SEPARATOR: char = '.';

/// A resolved playlist.
#[derive(Debug, Clone)]
pub struct ExpandedPlaylist {
    /// Display name, used by the caller for the output sub-directory.
    pub name: String,
    pub jobs: Vec<JobDescriptor>,
    /// The extractor's listing, kept for diagnostic dumps.
    pub info: PlaylistInfo,
}

/// Resolves `url` and builds one job per entry that has a sub-URL.
pub fn expand(extractor: &dyn MediaExtractor, url: &str) -> Result<ExpandedPlaylist, FetchError> {
    let info = extractor.resolve_playlist(url.trim())?;
    let jobs = jobs_from_listing(&info);
    let name = info
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .unwrap_or_else(fallback_name);
    tracing::info!(playlist = %name, entries = info.entries.len(), kept = jobs.len(), "playlist expanded");
    Ok(ExpandedPlaylist { name, jobs, info })
}

/// Numbers kept entries from 1, zero-padded to the width of the kept count:
/// 12 entries give `01.%(title)s` … `12.%(title)s`. Entries without a URL are
/// skipped and take no number.
pub fn jobs_from_listing(info: &PlaylistInfo) -> Vec<JobDescriptor> {
    let kept: Vec<&str> = info.entries.iter().filter_map(|e| e.source_url()).collect();
    let width = kept.len().to_string().len();

    kept.into_iter()
        .enumerate()
        .filter_map(|(i, url)| {
            let name = format!("{:0width$}{NUMBER_SEPARATOR}{TITLE_PLACEHOLDER}", i + 1);
            JobDescriptor::new(MediaKind::for_url(url), url, name)
        })
        .collect()
}

/// Local-time name used when the listing has no title.
pub fn fallback_name() -> String {
    Local::now().format(FALLBACK_NAME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{FetchOutcome, FetchRequest, PlaylistEntry};

    struct Listing(PlaylistInfo);

    impl MediaExtractor for Listing {
        fn resolve_playlist(&self, _url: &str) -> Result<PlaylistInfo, FetchError> {
            Ok(self.0.clone())
        }

        fn fetch(&self, _request: &FetchRequest) -> Result<FetchOutcome, FetchError> {
            Ok(FetchOutcome::default())
        }
    }

    fn entry(url: Option<&str>) -> PlaylistEntry {
        PlaylistEntry {
            url: url.map(str::to_string),
            title: None,
        }
    }

    #[test]
    fn skipped_entries_do_not_take_numbers() {
        let info = PlaylistInfo {
            title: Some("Mix".into()),
            entries: vec![
                entry(Some("https://music.youtube.com/watch?v=a")),
                entry(None),
                entry(Some("https://www.youtube.com/watch?v=b")),
            ],
            ..PlaylistInfo::default()
        };
        let jobs = jobs_from_listing(&info);
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].requested_name(), "1.%(title)s");
        assert_eq!(jobs[0].kind(), MediaKind::Audio);
        assert_eq!(jobs[1].requested_name(), "2.%(title)s");
        assert_eq!(jobs[1].kind(), MediaKind::Video);
    }

    #[test]
    fn numbers_are_padded_to_kept_count_width() {
        let mut entries: Vec<PlaylistEntry> = (0..12)
            .map(|i| format!("https://www.youtube.com/watch?v={i}"))
            .map(|u| entry(Some(&u)))
            .collect();
        entries.push(entry(Some("")));
        let info = PlaylistInfo {
            entries,
            ..PlaylistInfo::default()
        };
        let jobs = jobs_from_listing(&info);
        assert_eq!(jobs.len(), 12);
        assert_eq!(jobs[0].requested_name(), "01.%(title)s");
        assert_eq!(jobs[11].requested_name(), "12.%(title)s");
        assert_eq!(jobs[0].stem(), "01");
    }

    #[test]
    fn expand_uses_title_or_fallback() {
        let titled = Listing(PlaylistInfo {
            title: Some("  Road trip ".into()),
            ..PlaylistInfo::default()
        });
        let expanded = expand(&titled, "https://www.youtube.com/playlist?list=x").unwrap();
        assert_eq!(expanded.name, "Road trip");
        assert!(expanded.jobs.is_empty());

        let untitled = Listing(PlaylistInfo::default());
        let expanded = expand(&untitled, "https://www.youtube.com/playlist?list=x").unwrap();
        assert!(expanded.name.starts_with("Playlist-"));
        assert_eq!(expanded.name.len(), "Playlist-2024-01-01_00-00-00".len());
    }
}
