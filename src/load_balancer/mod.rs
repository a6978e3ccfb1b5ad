//! Load balancing groups.
//!
//! # Data Flow
//! ```text
//! Request without decision header
//!     → LBGroup("g") route matches (decision pending)
//! Request with `X-Load-Balancer-Member: g=i`
//!     → LBMember("g", i) route matches (member selected)
//! ```
//!
//! # Design Decisions
//! - Matching never picks a member itself; the decision arrives in the header
//! - Several decisions may share one header, comma separated

pub mod group;

pub use group::{decision, GroupSpec, MemberSpec, DECISION_HEADER};
