//! Request matching conditions.
//!
//! # Responsibilities
//! - Define the `RequestMatcher` trait every predicate compiles to
//! - Implement the predicates the engine understands natively
//!   (`Path`, `PathSubtree`, `PathRegexp`, `Host`, `Method`, `Methods`,
//!   `Header`, `HeaderRegexp`, `True`, `False`)
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Path matching is case-sensitive and segment based
//! - Host matching uses the Host header, then the URI authority
//! - Method matching is case-insensitive
//! - No conditions = always matches (wildcard)

use std::borrow::Cow;

use axum::body::Body;
use axum::http::Request;
use percent_encoding::percent_decode_str;
use regex::Regex;

/// Trait for matching requests against conditions.
pub trait RequestMatcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> bool;
}

/// The request path with percent escapes decoded; route patterns are
/// written decoded.
pub fn decoded_path(req: &Request<Body>) -> Cow<'_, str> {
    percent_decode_str(req.uri().path()).decode_utf8_lossy()
}

/// One segment of a path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `:name`, exactly one non-empty segment.
    Param,
    /// `*name`, the rest of the path.
    CatchAll,
}

fn split(path: &str) -> Vec<&str> {
    path.strip_prefix('/').unwrap_or(path).split('/').collect()
}

fn trim_trailing_slash(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

fn compile_segments(pattern: &str) -> Vec<Segment> {
    split(pattern)
        .into_iter()
        .map(|s| {
            if s.starts_with(':') {
                Segment::Param
            } else if s.starts_with('*') {
                Segment::CatchAll
            } else {
                Segment::Literal(s.to_string())
            }
        })
        .collect()
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    for (i, segment) in pattern.iter().enumerate() {
        match segment {
            Segment::CatchAll => return true,
            Segment::Param => match path.get(i) {
                Some(s) if !s.is_empty() => {}
                _ => return false,
            },
            Segment::Literal(literal) => match path.get(i) {
                Some(s) if s == literal => {}
                _ => return false,
            },
        }
    }
    path.len() == pattern.len()
}

/// `Path("/a/:id/*rest")`.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    pattern: String,
    segments: Vec<Segment>,
    ignore_trailing_slash: bool,
}

impl PathMatcher {
    pub fn new(pattern: impl Into<String>, ignore_trailing_slash: bool) -> Self {
        let pattern = pattern.into();
        let normalized = if ignore_trailing_slash {
            trim_trailing_slash(&pattern)
        } else {
            &pattern
        };
        let segments = compile_segments(normalized);
        Self {
            pattern,
            segments,
            ignore_trailing_slash,
        }
    }

    /// True when the pattern has no `:param` or `*rest` segments.
    pub fn is_literal(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, Segment::Literal(_)))
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn matches_path(&self, path: &str) -> bool {
        let path = if self.ignore_trailing_slash {
            trim_trailing_slash(path)
        } else {
            path
        };
        match_segments(&self.segments, &split(path))
    }
}

impl RequestMatcher for PathMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.matches_path(&decoded_path(req))
    }
}

/// `PathSubtree("/a")`: `/a` itself and everything below it.
#[derive(Debug, Clone)]
pub struct PathSubtreeMatcher {
    prefix: String,
    segments: Vec<Segment>,
}

impl PathSubtreeMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let trimmed = prefix.trim_end_matches('/');
        let mut segments = if trimmed.is_empty() {
            Vec::new()
        } else {
            compile_segments(trimmed)
        };
        segments.push(Segment::CatchAll);
        Self { prefix, segments }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl RequestMatcher for PathSubtreeMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        match_segments(&self.segments, &split(&decoded_path(req)))
    }
}

/// `PathRegexp(/^\/api/)`.
#[derive(Debug, Clone)]
pub struct PathRegexpMatcher {
    regex: Regex,
}

impl PathRegexpMatcher {
    pub fn new(regex: Regex) -> Self {
        Self { regex }
    }
}

impl RequestMatcher for PathRegexpMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.regex.is_match(&decoded_path(req))
    }
}

/// Matches the Host header against a regular expression.
#[derive(Debug, Clone)]
pub struct HostMatcher {
    regex: Regex,
}

impl HostMatcher {
    pub fn new(regex: Regex) -> Self {
        Self { regex }
    }
}

impl RequestMatcher for HostMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        let host = req
            .headers()
            .get("host")
            .and_then(|h| h.to_str().ok())
            .or_else(|| req.uri().authority().map(|a| a.as_str()));
        host.map(|h| self.regex.is_match(h)).unwrap_or(false)
    }
}

/// `Method("GET")` and `Methods("GET", "HEAD")`.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    methods: Vec<String>,
}

impl MethodMatcher {
    pub fn new(methods: Vec<String>) -> Self {
        Self {
            methods: methods.into_iter().map(|m| m.to_uppercase()).collect(),
        }
    }
}

impl RequestMatcher for MethodMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        let method = req.method().as_str();
        self.methods.iter().any(|m| m.eq_ignore_ascii_case(method))
    }
}

/// `Header("X-Name", "value")`: some value of the header equals `value`.
#[derive(Debug, Clone)]
pub struct HeaderMatcher {
    name: String,
    value: String,
}

impl HeaderMatcher {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl RequestMatcher for HeaderMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        req.headers()
            .get_all(self.name.as_str())
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v == self.value)
    }
}

/// `HeaderRegexp("X-Name", /re/)`: some value of the header matches.
#[derive(Debug, Clone)]
pub struct HeaderRegexpMatcher {
    name: String,
    regex: Regex,
}

impl HeaderRegexpMatcher {
    pub fn new(name: impl Into<String>, regex: Regex) -> Self {
        Self {
            name: name.into(),
            regex,
        }
    }
}

impl RequestMatcher for HeaderRegexpMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        req.headers()
            .get_all(self.name.as_str())
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| self.regex.is_match(v))
    }
}

/// `True()` / `False()`.
#[derive(Debug, Clone, Copy)]
pub struct ConstMatcher(bool);

impl ConstMatcher {
    pub fn new(value: bool) -> Self {
        Self(value)
    }
}

impl RequestMatcher for ConstMatcher {
    fn matches(&self, _req: &Request<Body>) -> bool {
        self.0
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug, Default)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn RequestMatcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn RequestMatcher>>) -> Self {
        Self { matchers }
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

impl RequestMatcher for AndMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.matchers.iter().all(|m| m.matches(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::default()).unwrap()
    }

    #[test]
    fn test_path_literal() {
        let matcher = PathMatcher::new("/api/v1", false);
        assert!(matcher.is_literal());
        assert!(matcher.matches(&get("http://localhost/api/v1")));
        assert!(!matcher.matches(&get("http://localhost/api/v1/")));
        assert!(!matcher.matches(&get("http://localhost/api")));
        assert!(!matcher.matches(&get("http://localhost/API/v1")));
    }

    #[test]
    fn test_paths_compared_decoded() {
        let literal = PathMatcher::new("/café/a b", false);
        assert!(literal.matches(&get("http://localhost/caf%C3%A9/a%20b")));
        assert!(!literal.matches(&get("http://localhost/cafe/a%20b")));

        let subtree = PathSubtreeMatcher::new("/café");
        assert!(subtree.matches(&get("http://localhost/caf%C3%A9/menu")));

        let regexp = PathRegexpMatcher::new(Regex::new("^/a b$").unwrap());
        assert!(regexp.matches(&get("http://localhost/a%20b")));
    }

    #[test]
    fn test_path_ignore_trailing_slash() {
        let matcher = PathMatcher::new("/api/", true);
        assert!(matcher.matches(&get("http://localhost/api")));
        assert!(matcher.matches(&get("http://localhost/api/")));

        let root = PathMatcher::new("/", true);
        assert!(root.matches(&get("http://localhost/")));
    }

    #[test]
    fn test_path_wildcards() {
        let matcher = PathMatcher::new("/users/:id/*rest", false);
        assert!(!matcher.is_literal());
        assert!(matcher.matches(&get("http://localhost/users/42")));
        assert!(matcher.matches(&get("http://localhost/users/42/posts/7")));
        assert!(!matcher.matches(&get("http://localhost/users/")));
        assert!(!matcher.matches(&get("http://localhost/groups/42")));
    }

    #[test]
    fn test_path_subtree() {
        let matcher = PathSubtreeMatcher::new("/api");
        assert!(matcher.matches(&get("http://localhost/api")));
        assert!(matcher.matches(&get("http://localhost/api/")));
        assert!(matcher.matches(&get("http://localhost/api/v1/users")));
        assert!(!matcher.matches(&get("http://localhost/apis")));

        let root = PathSubtreeMatcher::new("/");
        assert!(root.matches(&get("http://localhost/")));
        assert!(root.matches(&get("http://localhost/anything/at/all")));
    }

    #[test]
    fn test_host_matcher() {
        let matcher = HostMatcher::new(Regex::new("^(www[.])?example[.]com$").unwrap());

        let req1 = Request::builder()
            .uri("http://localhost/")
            .header("Host", "www.example.com")
            .body(Body::default())
            .unwrap();
        assert!(matcher.matches(&req1));

        let req2 = get("http://example.com/");
        assert!(matcher.matches(&req2)); // falls back to the authority

        let req3 = get("http://localhost/");
        assert!(!matcher.matches(&req3));
    }

    #[test]
    fn test_method_and_headers() {
        let req = Request::builder()
            .method("POST")
            .uri("http://localhost/")
            .header("X-Tenant", "acme")
            .body(Body::default())
            .unwrap();

        assert!(MethodMatcher::new(vec!["post".into()]).matches(&req));
        assert!(!MethodMatcher::new(vec!["GET".into(), "HEAD".into()]).matches(&req));
        assert!(HeaderMatcher::new("x-tenant", "acme").matches(&req));
        assert!(!HeaderMatcher::new("x-tenant", "Acme").matches(&req));
        assert!(HeaderRegexpMatcher::new("X-Tenant", Regex::new("^ac").unwrap()).matches(&req));
    }

    #[test]
    fn test_and_matcher() {
        let both = AndMatcher::new(vec![
            Box::new(PathSubtreeMatcher::new("/a")),
            Box::new(ConstMatcher::new(true)),
        ]);
        assert!(both.matches(&get("http://localhost/a/b")));

        let never = AndMatcher::new(vec![
            Box::new(PathSubtreeMatcher::new("/a")),
            Box::new(ConstMatcher::new(false)),
        ]);
        assert!(!never.matches(&get("http://localhost/a/b")));

        assert!(AndMatcher::default().matches(&get("http://localhost/")));
    }
}
