//! Filename sanitization and URL classification.
//!
//! Sanitized names are used both to build the output template handed to the
//! extractor and to match produced files back to their jobs.

mod host;
mod sanitize;

pub use host::{is_instagram_reel, is_music_domain, is_playlist_url, is_youtube};
pub use sanitize::{is_forbidden, sanitize, stem, REPLACEMENT, RESERVED_PREFIX};
