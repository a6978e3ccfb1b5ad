//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! Options (in code, or matcher.toml)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → Options (validated, consumed once by Matcher::new)
//!
//! With watch_routes_file:
//!     watcher.rs detects a change of the routes file
//!     → reload signal to the routing engine
//!     → engine re-reads, compiles and swaps its route table
//! ```
//!
//! # Design Decisions
//! - Options are consumed once; a matcher never observes later edits
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_options, ConfigurationError};
pub use schema::Options;
pub use validation::ValidationError;
pub use watcher::RoutesWatcher;
