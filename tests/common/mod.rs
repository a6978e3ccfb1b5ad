//! Shared utilities for integration tests.

use std::path::PathBuf;

use eskip_matcher::{Matcher, Options};
use tempfile::TempDir;

/// A routes file in its own temporary directory.
pub struct RoutesFile {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl RoutesFile {
    pub fn new(eskip: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.eskip");
        std::fs::write(&path, eskip).unwrap();
        Self { dir, path }
    }

    /// Replace the file contents atomically, so a watcher never reads a
    /// half-written file.
    #[allow(dead_code)]
    pub fn replace(&self, eskip: &str) {
        let staged = self.dir.path().join("routes.eskip.tmp");
        std::fs::write(&staged, eskip).unwrap();
        std::fs::rename(&staged, &self.path).unwrap();
    }

    pub fn options(&self) -> Options {
        Options::new(&self.path)
    }
}

/// Build a matcher over `eskip` with default options.
///
/// The routes file is returned so it outlives the matcher.
#[allow(dead_code)]
pub async fn matcher(eskip: &str) -> (Matcher, RoutesFile) {
    let file = RoutesFile::new(eskip);
    let matcher = Matcher::new(file.options()).await.unwrap();
    (matcher, file)
}
