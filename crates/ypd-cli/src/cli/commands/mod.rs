//! CLI command handlers. Each command is in its own file.

mod completions;
mod file;
mod get;
mod init;
mod playlist;

pub use completions::run_completions;
pub use file::{run_entries, run_file};
pub use get::run_get;
pub use init::run_init;
pub use playlist::run_playlist;
