//! Routes file watcher for hot reload.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// Watches a routes file and signals the routing engine to reload it.
pub struct RoutesWatcher {
    path: PathBuf,
    reload_tx: mpsc::UnboundedSender<()>,
}

impl RoutesWatcher {
    /// Create a new RoutesWatcher.
    ///
    /// Returns the watcher and a receiver of reload signals.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<()>) {
        let (reload_tx, reload_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                reload_tx,
            },
            reload_rx,
        )
    }

    /// Start watching in a background thread.
    ///
    /// The parent directory is watched so that files replaced by rename
    /// keep being observed. The returned handle stops watching on drop.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.reload_tx.clone();
        let file_name: Option<OsString> = self.path.file_name().map(|n| n.to_os_string());
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let relevant = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if relevant && (event.kind.is_modify() || event.kind.is_create()) {
                        tracing::debug!(paths = ?event.paths, "Routes file change detected");
                        let _ = tx.send(());
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Routes watcher started");
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_signals_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.eskip");
        std::fs::write(&path, "a: * -> <shunt>").unwrap();

        let (watcher, mut reloads) = RoutesWatcher::new(&path);
        let _handle = watcher.run().unwrap();

        std::fs::write(dir.path().join("unrelated.txt"), "x").unwrap();
        std::fs::write(&path, "b: * -> <shunt>").unwrap();

        let signal = tokio::time::timeout(Duration::from_secs(10), reloads.recv()).await;
        assert_eq!(signal.unwrap(), Some(()));
    }
}
