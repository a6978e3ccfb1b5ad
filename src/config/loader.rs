//! Options loading from disk, and the configuration error type.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::config::schema::Options;
use crate::config::validation::{validate_options, ValidationError};
use crate::routing::source::SourceError;

/// Errors raised while building a matcher.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid options file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("predicate `{0}` is registered more than once")]
    DuplicatePredicate(String),

    #[error("failed to watch routes file: {0}")]
    Watch(#[from] notify::Error),

    #[error("routes were not loaded within {timeout:?}")]
    NotReady { timeout: Duration },
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate options from a TOML file.
///
/// A relative `routes_file` is resolved against the directory of the
/// options file.
pub fn load_options(path: &Path) -> Result<Options, ConfigurationError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut options: Options = toml::from_str(&content)?;

    if options.routes_file.is_relative() && !options.routes_file.as_os_str().is_empty() {
        if let Some(dir) = path.parent() {
            options.routes_file = dir.join(&options.routes_file);
        }
    }

    validate_options(&options).map_err(ConfigurationError::Validation)?;

    Ok(options)
}
