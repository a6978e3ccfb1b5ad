//! Filter specifications and registry.
//!
//! # Data Flow
//! ```text
//! Registry::builtin()
//!     → register custom specs (replace same-named built-ins)
//!     → routing compiles each route's filter calls through the registry
//!     → unknown names or rejected arguments drop the route
//! ```
//!
//! # Design Decisions
//! - Filters are instantiated to validate routes, never executed
//! - Built-ins only check argument counts

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use thiserror::Error;

use crate::eskip::Arg;

pub mod builtin;
pub mod mock;

pub use mock::{mock_filters, MockFilter};

/// Rejected filter arguments.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("{name}: expected {expected} arguments, got {actual}")]
    ArgumentCount {
        name: String,
        expected: String,
        actual: usize,
    },

    #[error("{name}: invalid argument: {reason}")]
    InvalidArgument { name: String, reason: String },
}

/// An instantiated filter attached to a compiled route.
pub trait Filter: Send + Sync + Debug {
    fn name(&self) -> &str;
}

/// Factory for a named filter.
pub trait FilterSpec: Send + Sync + Debug {
    /// Name used in eskip, e.g. `setPath`.
    fn name(&self) -> &str;

    fn create_filter(&self, args: &[Arg]) -> Result<Box<dyn Filter>, FilterError>;
}

/// Filter specs by name.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    specs: HashMap<String, Arc<dyn FilterSpec>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in filters.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for spec in builtin::specs() {
            registry.register(spec);
        }
        registry
    }

    /// Register a spec, returning the one it replaced.
    pub fn register(&mut self, spec: Arc<dyn FilterSpec>) -> Option<Arc<dyn FilterSpec>> {
        self.specs.insert(spec.name().to_string(), spec)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn FilterSpec>> {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = Registry::builtin();
        assert!(registry.contains("setPath"));
        assert!(registry.contains("lbDecide"));
        assert!(!registry.contains("myCustomFilter"));
    }

    #[test]
    fn test_custom_replaces_builtin() {
        let mut registry = Registry::builtin();
        let before = registry.len();
        let replaced = registry.register(Arc::new(MockFilter::new("setPath")));
        assert!(replaced.is_some());
        assert_eq!(registry.len(), before);

        // the mock accepts any arguments, the built-in wanted exactly one
        let spec = registry.get("setPath").unwrap();
        assert!(spec.create_filter(&[]).is_ok());
    }
}
