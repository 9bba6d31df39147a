//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod fake_extractor;

use ypd_core::job::{JobDescriptor, MediaKind};

pub fn job(kind: MediaKind, url: &str, name: &str) -> JobDescriptor {
    JobDescriptor::new(kind, url, name).expect("valid job")
}
