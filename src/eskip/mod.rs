//! Eskip route definitions.
//!
//! # Data Flow
//! ```text
//! routes file (eskip text)
//!     → lexer.rs (tokens with line/column)
//!     → parser.rs (Route values, duplicate id checks)
//!     → route.rs (immutable route model)
//!     → printer.rs (compact or indented text, for diffs in assertions)
//! ```
//!
//! # Design Decisions
//! - Predicates and filters keep their source order
//! - Parsing is all-or-nothing: one syntax error rejects the document
//! - Semantic checks (known predicate names, argument types) belong to routing

mod lexer;
pub mod parser;
pub mod printer;
pub mod route;

pub use parser::{parse, ParseError};
pub use printer::PrettyPrintInfo;
pub use route::{Arg, Backend, Filter, Predicate, Route};
