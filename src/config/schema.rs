//! Matcher options.
//!
//! `Options` can be built in code or deserialized from a TOML file. The
//! custom predicate and filter specs are code-only and skipped by serde.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::filters::FilterSpec;
use crate::routing::predicate::PredicateSpec;

/// Options for building a `Matcher`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Path to a .eskip file defining routes.
    pub routes_file: PathBuf,

    /// Predicates in addition to the bundled ones.
    #[serde(skip)]
    pub custom_predicates: Vec<Arc<dyn PredicateSpec>>,

    /// Filters in addition to the built-in ones.
    #[serde(skip)]
    pub custom_filters: Vec<Arc<dyn FilterSpec>>,

    /// Names registered as mock filters, for route files using filters
    /// that only exist in production.
    pub mock_filters: Vec<String>,

    /// Treat `/a` and `/a/` as the same path.
    pub ignore_trailing_slash: bool,

    /// Log engine activity to stderr.
    pub verbose: bool,

    /// Reload routes when the file changes.
    pub watch_routes_file: bool,

    /// How long `Matcher::new` waits for the first route table.
    pub ready_timeout_ms: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            routes_file: PathBuf::new(),
            custom_predicates: Vec::new(),
            custom_filters: Vec::new(),
            mock_filters: Vec::new(),
            ignore_trailing_slash: false,
            verbose: false,
            watch_routes_file: false,
            ready_timeout_ms: 5_000,
        }
    }
}

impl Options {
    /// Options for the given routes file, everything else defaulted.
    pub fn new(routes_file: impl Into<PathBuf>) -> Self {
        Self {
            routes_file: routes_file.into(),
            ..Self::default()
        }
    }

    pub fn with_predicate(mut self, spec: Arc<dyn PredicateSpec>) -> Self {
        self.custom_predicates.push(spec);
        self
    }

    pub fn with_filters(mut self, specs: impl IntoIterator<Item = Arc<dyn FilterSpec>>) -> Self {
        self.custom_filters.extend(specs);
        self
    }

    pub fn ignore_trailing_slash(mut self, ignore: bool) -> Self {
        self.ignore_trailing_slash = ignore;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn watch(mut self, watch: bool) -> Self {
        self.watch_routes_file = watch;
        self
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::mock_filters;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert!(!options.ignore_trailing_slash);
        assert!(!options.verbose);
        assert!(!options.watch_routes_file);
        assert_eq!(options.ready_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_builder() {
        let options = Options::new("routes.eskip")
            .with_filters(mock_filters(&["auth"]))
            .ignore_trailing_slash(true)
            .verbose(true);
        assert_eq!(options.routes_file, PathBuf::from("routes.eskip"));
        assert_eq!(options.custom_filters.len(), 1);
        assert!(options.ignore_trailing_slash);
        assert!(options.verbose);
    }

    #[test]
    fn test_deserialize_partial() {
        let options: Options = toml::from_str(
            r#"
            routes_file = "routes.eskip"
            mock_filters = ["auth", "audit"]
            "#,
        )
        .unwrap();
        assert_eq!(options.routes_file, PathBuf::from("routes.eskip"));
        assert_eq!(options.mock_filters, vec!["auth", "audit"]);
        assert_eq!(options.ready_timeout_ms, 5_000);
        assert!(options.custom_predicates.is_empty());
    }
}
