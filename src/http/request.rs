//! Request synthesis.
//!
//! # Responsibilities
//! - Normalize request attributes (leading slash, default method)
//! - Build the synthetic request handed to the routing engine
//!
//! # Design Decisions
//! - The authority is a fixed placeholder; no network call is ever made
//! - The path is taken as written: dot segments stay, existing escapes stay,
//!   characters a URI cannot carry are percent-encoded
//! - Control characters and broken `%` escapes are rejected
//! - Normalization is written back so callers see what was matched
//! - Headers are inserted one value per name

use std::collections::BTreeMap;

use axum::body::Body;
use axum::http::header::{InvalidHeaderName, InvalidHeaderValue};
use axum::http::method::InvalidMethod;
use axum::http::{HeaderName, HeaderValue, Method, Request};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Host of every synthetic request.
pub const PLACEHOLDER_HOST: &str = "localhost";

const QUERY: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

const PATH: &AsciiSet = &QUERY.add(b'?');

/// The request to test: method, path and headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestAttributes {
    pub method: String,
    /// Path, optionally with a query string.
    pub path: String,
    pub headers: BTreeMap<String, String>,
}

impl RequestAttributes {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: BTreeMap::new(),
        }
    }

    /// Shorthand for a GET request to `path`.
    pub fn path(path: impl Into<String>) -> Self {
        Self::new("", path)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Attributes that cannot form a request.
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("invalid path {path:?}: {reason}")]
    Url { path: String, reason: String },

    #[error("invalid method: {0}")]
    Method(#[from] InvalidMethod),

    #[error("invalid header name: {0}")]
    HeaderName(#[from] InvalidHeaderName),

    #[error("invalid header value for {name}: {source}")]
    HeaderValue {
        name: String,
        #[source]
        source: InvalidHeaderValue,
    },

    #[error("failed to build request: {0}")]
    Request(#[from] axum::http::Error),
}

/// Normalize `attributes` in place and build the request they describe.
pub fn synthesize(attributes: &mut RequestAttributes) -> Result<Request<Body>, UrlError> {
    if !attributes.path.starts_with('/') {
        attributes.path.insert(0, '/');
    }
    if attributes.method.is_empty() {
        attributes.method = Method::GET.to_string();
    }

    let uri = request_uri(&attributes.path)?;

    let method = Method::from_bytes(attributes.method.to_uppercase().as_bytes())?;

    let mut req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())?;

    let headers = req.headers_mut();
    for (name, value) in &attributes.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())?;
        let header_value = HeaderValue::from_str(value).map_err(|source| UrlError::HeaderValue {
            name: name.clone(),
            source,
        })?;
        headers.insert(header_name, header_value);
    }

    Ok(req)
}

/// `http://localhost<path>`, fragment dropped.
fn request_uri(path: &str) -> Result<String, UrlError> {
    let invalid = |reason: String| UrlError::Url {
        path: path.to_string(),
        reason,
    };

    if let Some(c) = path.chars().find(|c| c.is_control()) {
        return Err(invalid(format!("control character {:?}", c)));
    }

    let target = path.split_once('#').map_or(path, |(target, _)| target);
    check_escapes(target).map_err(invalid)?;

    let mut uri = format!("http://{}", PLACEHOLDER_HOST);
    match target.split_once('?') {
        Some((path, query)) => {
            uri.extend(utf8_percent_encode(path, PATH));
            uri.push('?');
            uri.extend(utf8_percent_encode(query, QUERY));
        }
        None => uri.extend(utf8_percent_encode(target, PATH)),
    }
    Ok(uri)
}

/// Every `%` must start a two digit hex escape.
fn check_escapes(s: &str) -> Result<(), String> {
    let bytes = s.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b != b'%' {
            continue;
        }
        let escape = bytes.get(i + 1..i + 3);
        if !escape.is_some_and(|e| e.iter().all(u8::is_ascii_hexdigit)) {
            let end = (i + 3).min(s.len());
            return Err(format!(
                "invalid escape {:?}",
                String::from_utf8_lossy(&bytes[i..end])
            ));
        }
    }
    Ok(())
}
