//! Item parser: `kind ; url ; name` lines into job descriptors.

use thiserror::Error;

use super::{JobDescriptor, MediaKind};

/// Field delimiter in input lines.
pub const DELIMITER: char = ';';

/// Lines starting with this marker are skipped.
pub const COMMENT_MARKER: char = '#';

/// Why a line could not be turned into a job descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("expected `type ; url ; name` (two `;` delimiters)")]
    MissingFields,
    #[error("unknown media type `{0}` (expected audio or video)")]
    UnknownKind(String),
    #[error("empty url")]
    EmptyUrl,
    #[error("no entries found")]
    Empty,
}

/// Parse failure for one input line (1-based line number).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

/// Parses one line. Returns `Ok(None)` for blank and comment lines.
///
/// The first two delimiters split the line; further delimiters belong to the
/// name field.
pub fn parse_line(line: &str) -> Result<Option<JobDescriptor>, ParseErrorKind> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(COMMENT_MARKER) {
        return Ok(None);
    }

    let mut fields = line.splitn(3, DELIMITER).map(str::trim);
    let (Some(kind), Some(url), Some(name)) = (fields.next(), fields.next(), fields.next()) else {
        return Err(ParseErrorKind::MissingFields);
    };

    let kind: MediaKind = kind
        .parse()
        .map_err(|()| ParseErrorKind::UnknownKind(kind.to_string()))?;

    JobDescriptor::new(kind, url, name)
        .map(Some)
        .ok_or(ParseErrorKind::EmptyUrl)
}

/// Parses every line, failing on the first malformed one. Output order
/// follows input order.
pub fn parse_items<I, S>(lines: I) -> Result<Vec<JobDescriptor>, ParseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut jobs = Vec::new();
    for (idx, line) in lines.into_iter().enumerate() {
        match parse_line(line.as_ref()) {
            Ok(Some(job)) => jobs.push(job),
            Ok(None) => {}
            Err(kind) => return Err(ParseError { line: idx + 1, kind }),
        }
    }
    Ok(jobs)
}

/// Batch-mode parse: malformed lines are logged and skipped so one bad entry
/// does not abort the batch.
pub fn parse_items_lenient<I, S>(lines: I) -> Vec<JobDescriptor>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut jobs = Vec::new();
    for (idx, line) in lines.into_iter().enumerate() {
        let line = line.as_ref();
        match parse_line(line) {
            Ok(Some(job)) => jobs.push(job),
            Ok(None) => {}
            Err(kind) => {
                let err = ParseError { line: idx + 1, kind };
                tracing::warn!(line = line.trim(), "skipping entry: {}", err);
            }
        }
    }
    jobs
}
