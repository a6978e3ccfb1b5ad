//! Lifecycle of the routing engine.
//!
//! # Startup Sequence
//! ```text
//! 1. Validate options
//! 2. Open the routes file (fail fast on read/parse errors)
//! 3. Build predicate and filter registries
//! 4. Spawn the update task (initial load, then reloads)
//! 5. Wait for the first route table (readiness signal)
//! ```
//!
//! # Shutdown
//! ```text
//! Routing::close() or drop
//!     → shutdown.rs stop flag
//!     → update task exits, routes file watcher dropped
//!     → last route table stays readable
//! ```

pub mod shutdown;

pub use shutdown::{Shutdown, ShutdownSignal};
