//! HTTP request handling.
//!
//! # Data Flow
//! ```text
//! RequestAttributes (method, path, headers)
//!     → request.rs (normalize, build Request<Body>)
//!     → routing engine lookup
//! ```

pub mod request;

pub use request::{synthesize, RequestAttributes, UrlError, PLACEHOLDER_HOST};
