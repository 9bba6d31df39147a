//! Batch media download engine: parse entries, expand playlists, run a
//! bounded worker pool, verify results on disk, retry in rounds.

pub mod batch;
pub mod config;
pub mod extractor;
pub mod job;
pub mod logging;
pub mod playlist;
pub mod retry;
pub mod scheduler;
pub mod transcode;
pub mod url_model;
pub mod verify;
pub mod worker;

pub use batch::{run_batch, run_single, BatchOptions};
pub use extractor::{MediaExtractor, YtDlp};
pub use job::{JobDescriptor, MediaKind};
pub use retry::BatchReport;
