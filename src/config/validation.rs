//! Options validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that a routes file is named
//! - Validate value ranges and mock filter names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Options → Result<(), Vec<ValidationError>>
//! - Does not touch the file system; opening the routes file reports its own errors

use thiserror::Error;

use crate::config::schema::Options;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("routes_file is not set")]
    MissingRoutesFile,

    #[error("ready_timeout_ms must be greater than zero")]
    ZeroReadyTimeout,

    #[error("mock filter name `{0}` is not a valid identifier")]
    InvalidFilterName(String),
}

pub fn validate_options(options: &Options) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if options.routes_file.as_os_str().is_empty() {
        errors.push(ValidationError::MissingRoutesFile);
    }

    if options.ready_timeout_ms == 0 {
        errors.push(ValidationError::ZeroReadyTimeout);
    }

    for name in &options.mock_filters {
        if !is_identifier(name) {
            errors.push(ValidationError::InvalidFilterName(name.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid() {
        let mut options = Options::new("routes.eskip");
        options.mock_filters = vec!["auth".into(), "_x1".into()];
        assert!(validate_options(&options).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut options = Options::default();
        options.ready_timeout_ms = 0;
        options.mock_filters = vec!["1bad".into(), "has space".into()];
        let errors = validate_options(&options).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::MissingRoutesFile,
                ValidationError::ZeroReadyTimeout,
                ValidationError::InvalidFilterName("1bad".into()),
                ValidationError::InvalidFilterName("has space".into()),
            ]
        );
    }
}
