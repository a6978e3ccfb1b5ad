//! `Cookie("name", /value-regexp/)` predicate.

use axum::body::Body;
use axum::http::{header, Request};
use regex::Regex;

use crate::eskip::Arg;
use crate::routing::matcher::RequestMatcher;
use crate::routing::predicate::{args, PredicateError, PredicateSpec};

#[derive(Debug, Clone, Default)]
pub struct CookieSpec;

impl CookieSpec {
    pub fn new() -> Self {
        Self
    }
}

impl PredicateSpec for CookieSpec {
    fn name(&self) -> &str {
        "Cookie"
    }

    fn create(&self, values: &[Arg]) -> Result<Box<dyn RequestMatcher>, PredicateError> {
        args::count(self.name(), values, 2, 2)?;
        Ok(Box::new(CookieMatcher {
            name: args::text(self.name(), values, 0)?.to_string(),
            value: args::regex(self.name(), values, 1)?,
        }))
    }
}

#[derive(Debug)]
struct CookieMatcher {
    name: String,
    value: Regex,
}

impl RequestMatcher for CookieMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        cookie_values(req, &self.name).any(|v| self.value.is_match(v))
    }
}

/// All values of the named cookie across every `Cookie` header.
pub(crate) fn cookie_values<'a>(
    req: &'a Request<Body>,
    name: &'a str,
) -> impl Iterator<Item = &'a str> + 'a {
    req.headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(move |pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key.trim() == name).then(|| value.trim().trim_matches('"'))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_cookie(value: &str) -> Request<Body> {
        Request::builder()
            .uri("http://localhost/")
            .header("Cookie", value)
            .body(Body::default())
            .unwrap()
    }

    #[test]
    fn test_cookie_matches() {
        let matcher = CookieSpec::new()
            .create(&[Arg::String("flavor".into()), Arg::Regexp("^choc".into())])
            .unwrap();
        assert!(matcher.matches(&with_cookie("session=abc; flavor=chocolate")));
        assert!(!matcher.matches(&with_cookie("flavor=vanilla")));
        assert!(!matcher.matches(&with_cookie("session=chocolate")));
    }

    #[test]
    fn test_cookie_values() {
        let req = with_cookie("a=1; b=\"2\"; a=3");
        let values: Vec<_> = cookie_values(&req, "a").collect();
        assert_eq!(values, vec!["1", "3"]);
        assert_eq!(cookie_values(&req, "b").next(), Some("2"));
    }

    #[test]
    fn test_cookie_arguments() {
        assert!(CookieSpec::new().create(&[Arg::String("a".into())]).is_err());
        assert!(CookieSpec::new()
            .create(&[Arg::String("a".into()), Arg::Regexp("[".into())])
            .is_err());
    }
}
