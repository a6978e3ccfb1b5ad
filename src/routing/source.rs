//! Route sources.
//!
//! # Responsibilities
//! - Define the `DataClient` seam the engine loads routes through
//! - Read routes from an eskip file
//! - Hold in-memory route lists
//!
//! # Design Decisions
//! - `EskipFile::open` reads and parses eagerly so a bad file fails fast
//! - `load_all` re-reads on every call; the engine calls it on each reload

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::eskip::{self, ParseError, Route};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read routes file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse routes file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

/// A source of route definitions.
pub trait DataClient: Send + Sync + Debug {
    /// Load the complete current set of routes.
    fn load_all(&self) -> Result<Vec<Route>, SourceError>;
}

/// Routes read from an eskip file.
#[derive(Debug, Clone)]
pub struct EskipFile {
    path: PathBuf,
}

impl EskipFile {
    /// Open a routes file, failing if it cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let file = Self {
            path: path.as_ref().to_path_buf(),
        };
        file.load_all()?;
        Ok(file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataClient for EskipFile {
    fn load_all(&self) -> Result<Vec<Route>, SourceError> {
        let content = fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        eskip::parse(&content).map_err(|source| SourceError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

/// A fixed list of routes.
#[derive(Debug, Clone, Default)]
pub struct RouteList {
    routes: Vec<Route>,
}

impl RouteList {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// Parse routes from eskip text.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Ok(Self::new(eskip::parse(text)?))
    }
}

impl DataClient for RouteList {
    fn load_all(&self) -> Result<Vec<Route>, SourceError> {
        Ok(self.routes.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.eskip");
        fs::write(&path, r#"a: Path("/a") -> <shunt>"#).unwrap();

        let file = EskipFile::open(&path).unwrap();
        assert_eq!(file.load_all().unwrap()[0].id, "a");

        fs::write(&path, r#"a: Path("/a") -> <shunt>; b: * -> <shunt>"#).unwrap();
        assert_eq!(file.load_all().unwrap().len(), 2);
    }

    #[test]
    fn test_open_missing() {
        let err = EskipFile::open("/nonexistent/routes.eskip").unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }

    #[test]
    fn test_open_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("routes.eskip");
        fs::write(&path, "a: Path(\"/a\") ->").unwrap();

        let err = EskipFile::open(&path).unwrap_err();
        assert!(matches!(err, SourceError::Parse { .. }));
        assert!(err.to_string().contains("routes.eskip"));
    }

    #[test]
    fn test_route_list() {
        let list = RouteList::parse("a: * -> <shunt>").unwrap();
        assert_eq!(list.load_all().unwrap().len(), 1);
    }
}
