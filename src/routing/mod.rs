//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (startup and every reload):
//!     DataClient::load_all() → Route[]
//!     → compile predicates (built-ins, then the predicate registry)
//!     → instantiate filters (filter registry)
//!     → drop invalid routes, sort by priority
//!     → swap in as the current RouteTable
//!
//! Lookup:
//!     Request<Body> → router.rs → matcher.rs → Route or None
//! ```
//!
//! # Design Decisions
//! - A table is immutable once built; reloads replace it whole
//! - Deterministic: same table and request always match the same route
//! - First match wins (ordered by priority, then file order)

pub mod matcher;
pub mod predicate;
pub mod router;
pub mod source;

pub use matcher::RequestMatcher;
pub use predicate::{PredicateError, PredicateRegistry, PredicateSpec};
pub use router::{MatchingOptions, RouteError, RouteTable, Routing, RoutingOptions};
pub use source::{DataClient, EskipFile, RouteList, SourceError};
