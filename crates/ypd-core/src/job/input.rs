//! Classification of the single user-supplied input string.

use std::path::PathBuf;

use super::parse::{parse_line, ParseError, ParseErrorKind};
use super::{JobDescriptor, MediaKind, TITLE_PLACEHOLDER};
use crate::url_model;

/// Input meaning "read entries from the local input file".
pub const FILE_SENTINEL: &str = "file";

/// Entries file read when the sentinel is given.
pub const DEFAULT_INPUT_FILE: &str = "input.txt";

/// Header written by `ypd init`; every line is a comment so the file parses
/// to zero jobs until the user adds entries.
pub const INPUT_TEMPLATE: &str = "\
# audio ; http://link.com ; song %(title)s
# video ; https://link.com ; video %(title)s


";

/// What a single input string asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchInput {
    /// One entry, either literal `kind ; url ; name` or a bare media URL.
    Entry(JobDescriptor),
    /// A playlist URL to expand.
    Playlist(String),
    /// Entries from a local text file.
    File(PathBuf),
}

/// Classifies raw input: the file sentinel, a playlist URL, a bare URL, or a
/// literal entry. A literal entry that does not parse is an error.
pub fn classify_input(raw: &str) -> Result<BatchInput, ParseError> {
    let input = raw.trim();
    if input == FILE_SENTINEL {
        return Ok(BatchInput::File(PathBuf::from(DEFAULT_INPUT_FILE)));
    }
    if url_model::is_playlist_url(input) {
        return Ok(BatchInput::Playlist(input.to_string()));
    }
    if input.starts_with("http") {
        let kind = MediaKind::for_url(input);
        return JobDescriptor::new(kind, input, TITLE_PLACEHOLDER)
            .map(BatchInput::Entry)
            .ok_or(ParseError {
                line: 1,
                kind: ParseErrorKind::EmptyUrl,
            });
    }

    match parse_line(input) {
        Ok(Some(job)) => Ok(BatchInput::Entry(job)),
        Ok(None) => Err(ParseError {
            line: 1,
            kind: ParseErrorKind::Empty,
        }),
        Err(kind) => Err(ParseError { line: 1, kind }),
    }
}
