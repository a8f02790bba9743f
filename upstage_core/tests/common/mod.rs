//! Shared fixtures for the store integration tests.
//!
//! Every test gets its own temp directory so stores never collide, and
//! logging is routed through the test harness: it shows up only with
//! `-- --nocapture` or when a test fails.

#![allow(dead_code)]

use std::path::PathBuf;

use log::LevelFilter;
use tempfile::TempDir;

pub struct TempStore {
    // Keeps the directory alive for the duration of the test.
    pub dir: TempDir,
    pub path: PathBuf,
}

impl TempStore {
    pub fn new() -> Self {
        let _ = env_logger::Builder::from_default_env()
            .filter_level(LevelFilter::Debug)
            .is_test(true)
            .try_init();

        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("profiles.json");
        Self { dir, path }
    }

    /// File names currently in the store directory, sorted.
    pub fn dir_entries(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.dir.path())
            .expect("read temp dir")
            .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}
