//! `LBGroup` and `LBMember` predicates.
//!
//! A load balancing group is a set of routes sharing a group name: one
//! `LBGroup("g")` route that takes requests before a member was chosen,
//! and one `LBMember("g", i)` route per member. The choice is carried in
//! the decision header as `g=i`, so a request can address a member
//! directly by setting that header.

use axum::body::Body;
use axum::http::Request;

use crate::eskip::Arg;
use crate::routing::matcher::RequestMatcher;
use crate::routing::predicate::{args, PredicateError, PredicateSpec};

pub const DECISION_HEADER: &str = "x-load-balancer-member";

/// Header value that selects `index` within `group`.
pub fn decision(group: &str, index: usize) -> String {
    format!("{}={}", group, index)
}

fn decisions<'a>(req: &'a Request<Body>) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
    req.headers()
        .get_all(DECISION_HEADER)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|d| d.trim().split_once('='))
}

#[derive(Debug, Clone, Default)]
pub struct GroupSpec;

impl GroupSpec {
    pub fn new() -> Self {
        Self
    }
}

impl PredicateSpec for GroupSpec {
    fn name(&self) -> &str {
        "LBGroup"
    }

    fn create(&self, values: &[Arg]) -> Result<Box<dyn RequestMatcher>, PredicateError> {
        args::count(self.name(), values, 1, 1)?;
        Ok(Box::new(GroupMatcher {
            group: args::text(self.name(), values, 0)?.to_string(),
        }))
    }
}

/// Matches while no member of the group has been decided.
#[derive(Debug)]
struct GroupMatcher {
    group: String,
}

impl RequestMatcher for GroupMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        !decisions(req).any(|(group, _)| group == self.group)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemberSpec;

impl MemberSpec {
    pub fn new() -> Self {
        Self
    }
}

impl PredicateSpec for MemberSpec {
    fn name(&self) -> &str {
        "LBMember"
    }

    fn create(&self, values: &[Arg]) -> Result<Box<dyn RequestMatcher>, PredicateError> {
        args::count(self.name(), values, 2, 2)?;
        let group = args::text(self.name(), values, 0)?.to_string();
        let index = args::number(self.name(), values, 1)?;
        if index < 0.0 || index.fract() != 0.0 {
            return Err(PredicateError::InvalidArgument {
                name: self.name().to_string(),
                reason: format!("member index {} is not a non-negative integer", index),
            });
        }
        Ok(Box::new(MemberMatcher {
            group,
            index: index as usize,
        }))
    }
}

/// Matches when the decision header selects this member.
#[derive(Debug)]
struct MemberMatcher {
    group: String,
    index: usize,
}

impl RequestMatcher for MemberMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        decisions(req).any(|(group, index)| {
            group == self.group && index.parse::<usize>().ok() == Some(self.index)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(decision_value: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("http://localhost/");
        if let Some(d) = decision_value {
            builder = builder.header("X-Load-Balancer-Member", d);
        }
        builder.body(Body::default()).unwrap()
    }

    #[test]
    fn test_group_undecided() {
        let matcher = GroupSpec::new()
            .create(&[Arg::String("web".into())])
            .unwrap();
        assert!(matcher.matches(&request(None)));
        assert!(matcher.matches(&request(Some("api=0"))));
        assert!(!matcher.matches(&request(Some("web=1"))));
    }

    #[test]
    fn test_member_decided() {
        let matcher = MemberSpec::new()
            .create(&[Arg::String("web".into()), Arg::Number(1.0)])
            .unwrap();
        assert!(matcher.matches(&request(Some(&decision("web", 1)))));
        assert!(matcher.matches(&request(Some("api=0, web=1"))));
        assert!(!matcher.matches(&request(Some("web=0"))));
        assert!(!matcher.matches(&request(None)));
    }

    #[test]
    fn test_member_index_validation() {
        let spec = MemberSpec::new();
        assert!(spec
            .create(&[Arg::String("web".into()), Arg::Number(-1.0)])
            .is_err());
        assert!(spec
            .create(&[Arg::String("web".into()), Arg::Number(0.5)])
            .is_err());
        assert!(spec.create(&[Arg::String("web".into())]).is_err());
    }
}
