//! `ypd init` – write the commented entries template.

use anyhow::Result;
use std::path::{Path, PathBuf};
use ypd_core::batch;
use ypd_core::job::DEFAULT_INPUT_FILE;

pub fn run_init(path: Option<&Path>) -> Result<()> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_FILE));
    if batch::write_input_template(&path)? {
        println!("Wrote entries template to {}", path.display());
    } else {
        println!("{} already exists; left untouched.", path.display());
    }
    Ok(())
}
