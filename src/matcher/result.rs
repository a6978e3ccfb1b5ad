//! Result of a single match.

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::eskip::{PrettyPrintInfo, Route};
use crate::http::RequestAttributes;

const INDENT: &str = "  ";

/// The matched route (if any), the request that was tested and the
/// normalized attributes it was built from.
#[derive(Debug)]
pub struct TestResult {
    route: Option<Arc<Route>>,
    request: Request<Body>,
    attributes: RequestAttributes,
}

impl TestResult {
    pub(crate) fn new(
        route: Option<Arc<Route>>,
        request: Request<Body>,
        attributes: RequestAttributes,
    ) -> Self {
        Self {
            route,
            request,
            attributes,
        }
    }

    /// The matched route, `None` when nothing matched.
    pub fn route(&self) -> Option<&Route> {
        self.route.as_deref()
    }

    pub fn request(&self) -> &Request<Body> {
        &self.request
    }

    pub fn attributes(&self) -> &RequestAttributes {
        &self.attributes
    }

    pub fn is_match(&self) -> bool {
        self.route.is_some()
    }

    /// The matched route as `id: definition`, one predicate chain and one
    /// filter per line, with a trailing newline. Empty when nothing matched.
    pub fn pretty_print_route(&self) -> String {
        match &self.route {
            Some(route) => format!(
                "{}: {}\n",
                route.id,
                route.print(&PrettyPrintInfo::pretty(INDENT))
            ),
            None => String::new(),
        }
    }
}

impl Serialize for TestResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("TestResult", 5)?;
        state.serialize_field("route", &self.route.as_ref().map(|r| r.id.as_str()))?;
        state.serialize_field(
            "definition",
            &self
                .route
                .as_ref()
                .map(|r| r.print(&PrettyPrintInfo::default())),
        )?;
        state.serialize_field("method", self.request.method().as_str())?;
        state.serialize_field("uri", &self.request.uri().to_string())?;
        state.serialize_field("attributes", &self.attributes)?;
        state.end()
    }
}
