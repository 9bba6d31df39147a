//! Completion verifier.
//!
//! Success is decided by what appears in the output directory, never by what
//! a worker reports: a job succeeded iff a finished media file produced since
//! the batch started matches its sanitized stem.

mod assign;
mod snapshot;

pub use assign::FileClaims;
pub use snapshot::{OutputSnapshot, ProducedFile};

use assign::Candidate;

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::job::{JobDescriptor, MediaKind, NamePattern};
use crate::transcode::TEMP_SUFFIX;
use crate::url_model;

/// Extensions of finished media files.
pub const TARGET_EXTENSIONS: [&str; 2] =
    [MediaKind::Audio.extension(), MediaKind::Video.extension()];

/// Success/failure partition of one verification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verification {
    pub succeeded: Vec<JobDescriptor>,
    pub failed: Vec<JobDescriptor>,
    /// Intermediate files deleted during this pass.
    pub removed: Vec<PathBuf>,
    /// Files attributed to placeholder-named jobs, by index into the verified jobs.
    pub claims: FileClaims,
}

/// True for names that are finished media: `<non-empty base>.mp3|.mp4`,
/// excluding cover-embedding leftovers like `x.mp3.temp.mp3`.
pub fn is_finished_media(name: &str) -> bool {
    if name.ends_with(TEMP_SUFFIX) {
        return false;
    }
    match name.rsplit_once('.') {
        Some((base, ext)) => !base.is_empty() && TARGET_EXTENSIONS.contains(&ext),
        None => false,
    }
}

/// Finished media files produced in `output_dir` after `since`.
pub fn produced_media_since(output_dir: &Path, since: SystemTime) -> io::Result<Vec<PathBuf>> {
    let snapshot = OutputSnapshot::capture(output_dir)?;
    Ok(snapshot
        .newer_than(since)
        .filter(|f| is_finished_media(&f.name))
        .map(|f| f.path.clone())
        .collect())
}

/// Partitions `jobs` by whether a finished media file newer than `since`
/// matches each job's key. With `cleanup`, non-media files newer than
/// `since` are deleted; they are never counted either way, so repeated
/// passes over an unchanged directory give the same partition.
///
/// A job's key is its sanitized name up to the first dot, and a file's key
/// is its name up to the first dot. Literal keys compare by equality on that
/// key only, not on the whole file name, so `Live. Part 1` and `Live. Part 2`
/// both key to `Live` and share a `Live.mp3`. Keys with a title placeholder
/// match as patterns; see [`verify_with_claims`].
pub fn verify(
    output_dir: &Path,
    jobs: &[JobDescriptor],
    since: SystemTime,
    cleanup: bool,
) -> io::Result<Verification> {
    verify_with_claims(output_dir, jobs, since, cleanup, &FileClaims::new())
}

/// [`verify`] with file attributions from earlier passes.
///
/// Placeholder jobs with identical patterns form a group. A file in
/// `settled` only satisfies the job it is attributed to; every other member
/// needs its own unattributed matching file. A group with fewer such files
/// than members leaves all of those members failed, since there is no way to
/// tell which of them produced what.
pub fn verify_with_claims(
    output_dir: &Path,
    jobs: &[JobDescriptor],
    since: SystemTime,
    cleanup: bool,
    settled: &FileClaims,
) -> io::Result<Verification> {
    let snapshot = OutputSnapshot::capture(output_dir)?;
    let mut removed = Vec::new();
    let mut files: Vec<Candidate<'_>> = Vec::new();

    for file in snapshot.newer_than(since) {
        if is_finished_media(&file.name) {
            files.push(Candidate {
                name: &file.name,
                key: url_model::stem(&file.name),
            });
        } else if cleanup {
            match std::fs::remove_file(&file.path) {
                Ok(()) => {
                    tracing::debug!(path = %file.path.display(), "removed intermediate file");
                    removed.push(file.path.clone());
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %file.path.display(), "could not remove intermediate file: {}", e)
                }
            }
        }
    }

    let patterns: Vec<NamePattern> = jobs.iter().map(|j| NamePattern::compile(&j.stem())).collect();
    let assignment = assign::assign(&patterns, &files, settled);

    let mut verification = Verification {
        removed,
        claims: assignment.claims,
        ..Verification::default()
    };
    for (job, ok) in jobs.iter().zip(assignment.matched) {
        if ok {
            verification.succeeded.push(job.clone());
        } else {
            verification.failed.push(job.clone());
        }
    }
    Ok(verification)
}
