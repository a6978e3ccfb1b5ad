//! Predicates bundled with every matcher.
//!
//! # Responsibilities
//! - Client address predicates (`Source`, `SourceFromLast`)
//! - Time window predicates (`Between`, `Before`, `After`)
//! - Request content predicates (`Cookie`, `QueryParam`)
//! - Traffic splitting (`Traffic`)
//!
//! The load balancer predicates (`LBGroup`, `LBMember`) live in
//! `load_balancer` and are part of the same bundle.

use std::sync::Arc;

use crate::load_balancer::group::{GroupSpec, MemberSpec};
use crate::routing::predicate::PredicateSpec;

pub mod cookie;
pub mod interval;
pub mod query;
pub mod source;
pub mod traffic;

pub use cookie::CookieSpec;
pub use interval::IntervalSpec;
pub use query::QueryParamSpec;
pub use source::SourceSpec;
pub use traffic::TrafficSpec;

/// The fixed predicate bundle appended to caller-supplied predicates.
pub fn bundled() -> Vec<Arc<dyn PredicateSpec>> {
    vec![
        Arc::new(SourceSpec::new()),
        Arc::new(SourceSpec::from_last()),
        Arc::new(IntervalSpec::between()),
        Arc::new(IntervalSpec::before()),
        Arc::new(IntervalSpec::after()),
        Arc::new(CookieSpec::new()),
        Arc::new(QueryParamSpec::new()),
        Arc::new(TrafficSpec::new()),
        Arc::new(GroupSpec::new()),
        Arc::new(MemberSpec::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_bundle_names() {
        let names: HashSet<String> = bundled().iter().map(|s| s.name().to_string()).collect();
        let expected: HashSet<String> = [
            "Source",
            "SourceFromLast",
            "Between",
            "Before",
            "After",
            "Cookie",
            "QueryParam",
            "Traffic",
            "LBGroup",
            "LBMember",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(names, expected);
    }
}
