//! In-process [`MediaExtractor`] that writes files into the output template,
//! sleeps, and fails on demand. Tracks how many fetches run at once.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use ypd_core::extractor::{
    FetchError, FetchOutcome, FetchRequest, MediaExtractor, MediaMetadata, PlaylistInfo,
};

#[derive(Default)]
pub struct FakeExtractor {
    /// Time every fetch takes.
    pub delay: Duration,
    /// URL -> number of leading calls that fail (`usize::MAX` = always).
    pub failures: HashMap<String, usize>,
    /// URL -> sleep before anything else, to simulate a hung transfer.
    pub stalls: HashMap<String, Duration>,
    pub playlist: Option<PlaylistInfo>,
    active: AtomicUsize,
    max_active: AtomicUsize,
    calls: Mutex<HashMap<String, usize>>,
}

impl FakeExtractor {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn always_fail(mut self, url: &str) -> Self {
        self.failures.insert(url.to_string(), usize::MAX);
        self
    }

    pub fn fail_first(mut self, url: &str, times: usize) -> Self {
        self.failures.insert(url.to_string(), times);
        self
    }

    pub fn with_playlist(mut self, info: PlaylistInfo) -> Self {
        self.playlist = Some(info);
        self
    }

    pub fn stall(mut self, url: &str, duration: Duration) -> Self {
        self.stalls.insert(url.to_string(), duration);
        self
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    /// `%(ext)s` -> kind extension, `%(title)s` -> a title derived from the URL.
    fn render(request: &FetchRequest) -> PathBuf {
        let id = request
            .url
            .rsplit(|c: char| c == '/' || c == '=')
            .next()
            .unwrap_or("x");
        let title = format!("Title {id}");
        let rendered = request
            .output_template
            .to_string_lossy()
            .replace("%(ext)s", request.kind.extension())
            .replace("%(title)s", &title);
        PathBuf::from(rendered)
    }
}

struct ActiveGuard<'a>(&'a AtomicUsize);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MediaExtractor for FakeExtractor {
    fn resolve_playlist(&self, _url: &str) -> Result<PlaylistInfo, FetchError> {
        Ok(self.playlist.clone().unwrap_or_default())
    }

    fn fetch(&self, request: &FetchRequest) -> Result<FetchOutcome, FetchError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = ActiveGuard(&self.active);
        self.max_active.fetch_max(now, Ordering::SeqCst);

        let call = {
            let mut calls = self.calls.lock().unwrap();
            let n = calls.entry(request.url.clone()).or_insert(0);
            *n += 1;
            *n
        };

        if let Some(stall) = self.stalls.get(&request.url) {
            std::thread::sleep(*stall);
        }
        std::thread::sleep(self.delay);

        if self.failures.get(&request.url).is_some_and(|&n| call <= n) {
            return Err(FetchError::Io(std::io::Error::other("simulated failure")));
        }

        let path = Self::render(request);
        fs::write(&path, b"media")?;
        Ok(FetchOutcome {
            final_path: Some(path),
            metadata: MediaMetadata::default(),
            raw: serde_json::Value::Null,
        })
    }
}
