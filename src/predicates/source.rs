//! `Source` and `SourceFromLast` predicates.
//!
//! The client address is taken from `X-Forwarded-For` (first or last entry),
//! falling back to a `SocketAddr` request extension when the header is
//! absent. Arguments are IP addresses or CIDR networks.

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use axum::body::Body;
use axum::http::Request;
use ipnet::IpNet;

use crate::eskip::Arg;
use crate::routing::matcher::RequestMatcher;
use crate::routing::predicate::{args, PredicateError, PredicateSpec};

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    First,
    Last,
}

#[derive(Debug, Clone)]
pub struct SourceSpec {
    position: Position,
}

impl SourceSpec {
    /// `Source(...)`: the first forwarded address is the client.
    pub fn new() -> Self {
        Self {
            position: Position::First,
        }
    }

    /// `SourceFromLast(...)`: the last forwarded address is the client.
    pub fn from_last() -> Self {
        Self {
            position: Position::Last,
        }
    }
}

impl Default for SourceSpec {
    fn default() -> Self {
        Self::new()
    }
}

impl PredicateSpec for SourceSpec {
    fn name(&self) -> &str {
        match self.position {
            Position::First => "Source",
            Position::Last => "SourceFromLast",
        }
    }

    fn create(&self, values: &[Arg]) -> Result<Box<dyn RequestMatcher>, PredicateError> {
        if values.is_empty() {
            return Err(PredicateError::ArgumentCount {
                name: self.name().to_string(),
                expected: "at least 1".to_string(),
                actual: 0,
            });
        }

        let networks = (0..values.len())
            .map(|i| {
                let text = args::text(self.name(), values, i)?;
                parse_network(text).ok_or_else(|| PredicateError::InvalidArgument {
                    name: self.name().to_string(),
                    reason: format!("`{}` is not an IP address or network", text),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Box::new(SourceMatcher {
            networks,
            position: self.position,
        }))
    }
}

fn parse_network(text: &str) -> Option<IpNet> {
    if text.contains('/') {
        IpNet::from_str(text).ok()
    } else {
        IpAddr::from_str(text).ok().map(IpNet::from)
    }
}

#[derive(Debug)]
struct SourceMatcher {
    networks: Vec<IpNet>,
    position: Position,
}

impl SourceMatcher {
    fn client_address(&self, req: &Request<Body>) -> Option<IpAddr> {
        let forwarded = req
            .headers()
            .get(X_FORWARDED_FOR)
            .and_then(|v| v.to_str().ok());

        match forwarded {
            Some(list) => {
                let mut entries = list.split(',').map(str::trim).filter(|e| !e.is_empty());
                let entry = match self.position {
                    Position::First => entries.next(),
                    Position::Last => entries.last(),
                };
                entry.and_then(|e| IpAddr::from_str(e).ok())
            }
            None => req.extensions().get::<SocketAddr>().map(|a| a.ip()),
        }
    }
}

impl RequestMatcher for SourceMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        match self.client_address(req) {
            Some(ip) => self.networks.iter().any(|n| n.contains(&ip)),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forwarded(value: &str) -> Request<Body> {
        Request::builder()
            .uri("http://localhost/")
            .header("X-Forwarded-For", value)
            .body(Body::default())
            .unwrap()
    }

    fn strings(values: &[&str]) -> Vec<Arg> {
        values.iter().map(|v| Arg::String(v.to_string())).collect()
    }

    #[test]
    fn test_source_first() {
        let matcher = SourceSpec::new()
            .create(&strings(&["10.0.0.0/8", "192.168.1.1"]))
            .unwrap();
        assert!(matcher.matches(&forwarded("10.1.2.3, 8.8.8.8")));
        assert!(matcher.matches(&forwarded("192.168.1.1")));
        assert!(!matcher.matches(&forwarded("8.8.8.8, 10.1.2.3")));
    }

    #[test]
    fn test_source_from_last() {
        let matcher = SourceSpec::from_last()
            .create(&strings(&["10.0.0.0/8"]))
            .unwrap();
        assert!(matcher.matches(&forwarded("8.8.8.8, 10.1.2.3")));
        assert!(!matcher.matches(&forwarded("10.1.2.3, 8.8.8.8")));
    }

    #[test]
    fn test_remote_addr_fallback() {
        let matcher = SourceSpec::new().create(&strings(&["::1"])).unwrap();
        let mut req = Request::builder()
            .uri("http://localhost/")
            .body(Body::default())
            .unwrap();
        assert!(!matcher.matches(&req));

        req.extensions_mut()
            .insert(SocketAddr::from_str("[::1]:4000").unwrap());
        assert!(matcher.matches(&req));
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(SourceSpec::new().create(&[]).is_err());
        assert!(SourceSpec::new().create(&strings(&["not-an-ip"])).is_err());
        assert!(SourceSpec::new().create(&[Arg::Number(1.0)]).is_err());
    }
}
