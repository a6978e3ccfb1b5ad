//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Matcher::new(verbose)
//!     → logging.rs (muted or stderr Logger)
//!     → routing engine update task runs under the logger
//!     → lookups enter the logger's scope
//!
//! eskip-matcher binary
//!     → logging.rs init() (global subscriber)
//! ```
//!
//! # Design Decisions
//! - Structured fields (route ids, counts) rather than formatted strings
//! - No global state touched by library code

pub mod logging;

pub use logging::Logger;
