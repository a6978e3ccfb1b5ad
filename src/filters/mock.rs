//! Placeholder filters for route files that use filters unknown here.

use std::sync::Arc;

use super::{Filter, FilterError, FilterSpec};
use crate::eskip::Arg;

/// A filter spec that accepts any arguments and does nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockFilter {
    name: String,
}

impl MockFilter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl FilterSpec for MockFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn create_filter(&self, _args: &[Arg]) -> Result<Box<dyn Filter>, FilterError> {
        Ok(Box::new(self.clone()))
    }
}

impl Filter for MockFilter {
    fn name(&self) -> &str {
        &self.name
    }
}

/// One mock filter spec per name, in the given order.
pub fn mock_filters<S: AsRef<str>>(names: &[S]) -> Vec<Arc<dyn FilterSpec>> {
    names
        .iter()
        .map(|n| Arc::new(MockFilter::new(n.as_ref())) as Arc<dyn FilterSpec>)
        .collect()
}
