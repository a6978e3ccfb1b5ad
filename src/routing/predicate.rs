//! Predicate specifications and their registry.
//!
//! # Responsibilities
//! - Define the `PredicateSpec` seam for custom predicates
//! - Validate predicate arguments when routes are compiled
//! - Resolve predicate names to specs
//!
//! # Design Decisions
//! - Specs are shared (`Arc`) so one `Options` value can build several matchers
//! - A custom spec replaces a bundled spec of the same name
//! - Two custom specs with the same name are rejected at build time

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use thiserror::Error;

use crate::eskip::Arg;
use crate::routing::matcher::RequestMatcher;

/// Rejected predicate arguments.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredicateError {
    #[error("{name}: expected {expected} arguments, got {actual}")]
    ArgumentCount {
        name: String,
        expected: String,
        actual: usize,
    },

    #[error("{name}: argument {index} must be {expected}")]
    ArgumentType {
        name: String,
        index: usize,
        expected: &'static str,
    },

    #[error("{name}: invalid argument: {reason}")]
    InvalidArgument { name: String, reason: String },
}

/// Factory for a named predicate.
pub trait PredicateSpec: Send + Sync + Debug {
    /// Name used in eskip, e.g. `Cookie`.
    fn name(&self) -> &str;

    /// Build a matcher from the arguments written in the route.
    fn create(&self, args: &[Arg]) -> Result<Box<dyn RequestMatcher>, PredicateError>;
}

/// Predicate specs by name.
#[derive(Debug, Default, Clone)]
pub struct PredicateRegistry {
    specs: HashMap<String, Arc<dyn PredicateSpec>>,
}

impl PredicateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a spec, returning the one it replaced.
    pub fn register(&mut self, spec: Arc<dyn PredicateSpec>) -> Option<Arc<dyn PredicateSpec>> {
        self.specs.insert(spec.name().to_string(), spec)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn PredicateSpec>> {
        self.specs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Argument accessors shared by the predicate implementations.
pub(crate) mod args {
    use super::PredicateError;
    use crate::eskip::Arg;

    pub fn count(
        name: &str,
        args: &[Arg],
        min: usize,
        max: usize,
    ) -> Result<(), PredicateError> {
        if args.len() < min || args.len() > max {
            let expected = if min == max {
                min.to_string()
            } else {
                format!("{}..{}", min, max)
            };
            return Err(PredicateError::ArgumentCount {
                name: name.to_string(),
                expected,
                actual: args.len(),
            });
        }
        Ok(())
    }

    /// A string or regexp argument.
    pub fn text<'a>(name: &str, args: &'a [Arg], index: usize) -> Result<&'a str, PredicateError> {
        args.get(index)
            .and_then(Arg::as_str)
            .ok_or_else(|| PredicateError::ArgumentType {
                name: name.to_string(),
                index,
                expected: "a string",
            })
    }

    pub fn number(name: &str, args: &[Arg], index: usize) -> Result<f64, PredicateError> {
        args.get(index)
            .and_then(Arg::as_number)
            .ok_or_else(|| PredicateError::ArgumentType {
                name: name.to_string(),
                index,
                expected: "a number",
            })
    }

    pub fn regex(name: &str, args: &[Arg], index: usize) -> Result<regex::Regex, PredicateError> {
        let source = text(name, args, index)?;
        regex::Regex::new(source).map_err(|e| PredicateError::InvalidArgument {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::matcher::ConstMatcher;

    #[derive(Debug)]
    struct Always(&'static str);

    impl PredicateSpec for Always {
        fn name(&self) -> &str {
            self.0
        }

        fn create(&self, _args: &[Arg]) -> Result<Box<dyn RequestMatcher>, PredicateError> {
            Ok(Box::new(ConstMatcher::new(true)))
        }
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = PredicateRegistry::new();
        assert!(registry.register(Arc::new(Always("A"))).is_none());
        assert!(registry.register(Arc::new(Always("A"))).is_some());
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("A"));
    }

    #[test]
    fn test_argument_helpers() {
        let values = vec![Arg::String("x".into()), Arg::Number(2.0)];
        assert!(args::count("P", &values, 2, 2).is_ok());
        assert_eq!(
            args::count("P", &values, 1, 1).unwrap_err().to_string(),
            "P: expected 1 arguments, got 2"
        );
        assert_eq!(args::text("P", &values, 0).unwrap(), "x");
        assert!(args::text("P", &values, 1).is_err());
        assert_eq!(args::number("P", &values, 1).unwrap(), 2.0);
        assert!(args::regex("P", &[Arg::Regexp("(".into())], 0).is_err());
    }
}
