//! Eskip route matcher.
//!
//! Checks, without any network traffic, which route of an eskip file a
//! request (method, path, headers) would be routed to.
//!
//! ```no_run
//! use eskip_matcher::{mock_filters, Matcher, Options, RequestAttributes};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let options = Options::new("routes.eskip").with_filters(mock_filters(&["auth"]));
//! let matcher = Matcher::new(options).await?;
//!
//! let mut attributes = RequestAttributes::path("/foo");
//! let result = matcher.test(&mut attributes)?;
//! print!("{}", result.pretty_print_route());
//! # Ok(())
//! # }
//! ```

// Route definitions
pub mod eskip;

// Matching engine
pub mod filters;
pub mod load_balancer;
pub mod predicates;
pub mod routing;

// Façade
pub mod http;
pub mod matcher;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::{ConfigurationError, Options};
pub use filters::mock_filters;
pub use http::{RequestAttributes, UrlError};
pub use lifecycle::Shutdown;
pub use matcher::{Matcher, TestResult};
