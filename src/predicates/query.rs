//! `QueryParam("name")` and `QueryParam("name", "^regexp$")` predicates.

use axum::body::Body;
use axum::http::Request;
use regex::Regex;

use crate::eskip::Arg;
use crate::routing::matcher::RequestMatcher;
use crate::routing::predicate::{args, PredicateError, PredicateSpec};

#[derive(Debug, Clone, Default)]
pub struct QueryParamSpec;

impl QueryParamSpec {
    pub fn new() -> Self {
        Self
    }
}

impl PredicateSpec for QueryParamSpec {
    fn name(&self) -> &str {
        "QueryParam"
    }

    fn create(&self, values: &[Arg]) -> Result<Box<dyn RequestMatcher>, PredicateError> {
        args::count(self.name(), values, 1, 2)?;
        let name = args::text(self.name(), values, 0)?.to_string();
        let value = if values.len() == 2 {
            Some(args::regex(self.name(), values, 1)?)
        } else {
            None
        };
        Ok(Box::new(QueryParamMatcher { name, value }))
    }
}

#[derive(Debug)]
struct QueryParamMatcher {
    name: String,
    value: Option<Regex>,
}

impl RequestMatcher for QueryParamMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        let query = match req.uri().query() {
            Some(q) => q,
            None => return false,
        };

        url::form_urlencoded::parse(query.as_bytes())
            .filter(|(key, _)| key == &self.name)
            .any(|(_, value)| match &self.value {
                Some(regex) => regex.is_match(&value),
                None => true,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::default()).unwrap()
    }

    #[test]
    fn test_presence() {
        let matcher = QueryParamSpec::new()
            .create(&[Arg::String("debug".into())])
            .unwrap();
        assert!(matcher.matches(&get("http://localhost/?debug")));
        assert!(matcher.matches(&get("http://localhost/?a=1&debug=0")));
        assert!(!matcher.matches(&get("http://localhost/?a=1")));
        assert!(!matcher.matches(&get("http://localhost/")));
    }

    #[test]
    fn test_value_regexp() {
        let matcher = QueryParamSpec::new()
            .create(&[Arg::String("lang".into()), Arg::String("^(en|de)$".into())])
            .unwrap();
        assert!(matcher.matches(&get("http://localhost/?lang=de")));
        assert!(matcher.matches(&get("http://localhost/?lang=fr&lang=en")));
        assert!(!matcher.matches(&get("http://localhost/?lang=fr")));
    }

    #[test]
    fn test_decoded_values() {
        let matcher = QueryParamSpec::new()
            .create(&[Arg::String("q".into()), Arg::String("^a b$".into())])
            .unwrap();
        assert!(matcher.matches(&get("http://localhost/?q=a%20b")));
    }
}
