//! Output directory snapshots: regular files with modification times.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A regular file found directly under the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducedFile {
    pub name: String,
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Regular files (no directories, no recursion) of one directory.
#[derive(Debug, Clone, Default)]
pub struct OutputSnapshot {
    files: Vec<ProducedFile>,
}

impl OutputSnapshot {
    /// Lists `dir`. A missing directory yields an empty snapshot. Files are
    /// sorted by name so consumers iterate deterministically.
    pub fn capture(dir: &Path) -> io::Result<Self> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry?;
            let meta = match entry.metadata() {
                Ok(meta) => meta,
                // Removed between listing and stat.
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e),
            };
            if !meta.is_file() {
                continue;
            }
            files.push(ProducedFile {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path(),
                modified: meta.modified()?,
            });
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Self { files })
    }

    pub fn files(&self) -> &[ProducedFile] {
        &self.files
    }

    /// Files modified strictly after `since`.
    pub fn newer_than(&self, since: SystemTime) -> impl Iterator<Item = &ProducedFile> {
        self.files.iter().filter(move |f| f.modified > since)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let snap = OutputSnapshot::capture(&dir.path().join("absent")).unwrap();
        assert!(snap.files().is_empty());
    }

    #[test]
    fn lists_only_regular_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.mp3"), b"x").unwrap();
        fs::write(dir.path().join("a.mp4"), b"x").unwrap();
        fs::create_dir(dir.path().join("sub.mp3")).unwrap();
        let snap = OutputSnapshot::capture(dir.path()).unwrap();
        let names: Vec<&str> = snap.files().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a.mp4", "b.mp3"]);
    }

    #[test]
    fn newer_than_is_strict() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("old.mp3"), b"x").unwrap();
        let snap = OutputSnapshot::capture(dir.path()).unwrap();
        let modified = snap.files()[0].modified;
        assert_eq!(snap.newer_than(modified).count(), 0);
        assert_eq!(snap.newer_than(modified - Duration::from_millis(1)).count(), 1);
    }
}
