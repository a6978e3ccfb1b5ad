//! `Traffic(chance)` and sticky `Traffic(chance, "cookie", "value")`.
//!
//! Without cookie arguments a request matches with the given probability.
//! With cookie arguments, a request already carrying the cookie matches
//! exactly when the cookie has the given value; requests without the cookie
//! fall back to the probability.

use axum::body::Body;
use axum::http::Request;
use rand::Rng;

use crate::eskip::Arg;
use crate::predicates::cookie::cookie_values;
use crate::routing::matcher::RequestMatcher;
use crate::routing::predicate::{args, PredicateError, PredicateSpec};

#[derive(Debug, Clone, Default)]
pub struct TrafficSpec;

impl TrafficSpec {
    pub fn new() -> Self {
        Self
    }
}

impl PredicateSpec for TrafficSpec {
    fn name(&self) -> &str {
        "Traffic"
    }

    fn create(&self, values: &[Arg]) -> Result<Box<dyn RequestMatcher>, PredicateError> {
        if values.len() != 1 && values.len() != 3 {
            return Err(PredicateError::ArgumentCount {
                name: self.name().to_string(),
                expected: "1 or 3".to_string(),
                actual: values.len(),
            });
        }

        let chance = args::number(self.name(), values, 0)?;
        if !(0.0..=1.0).contains(&chance) {
            return Err(PredicateError::InvalidArgument {
                name: self.name().to_string(),
                reason: format!("chance {} is outside [0, 1]", chance),
            });
        }

        let sticky = if values.len() == 3 {
            Some((
                args::text(self.name(), values, 1)?.to_string(),
                args::text(self.name(), values, 2)?.to_string(),
            ))
        } else {
            None
        };

        Ok(Box::new(TrafficMatcher { chance, sticky }))
    }
}

#[derive(Debug)]
struct TrafficMatcher {
    chance: f64,
    sticky: Option<(String, String)>,
}

impl RequestMatcher for TrafficMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        if let Some((name, value)) = &self.sticky {
            if let Some(current) = cookie_values(req, name).next() {
                return current == value;
            }
        }
        rand::thread_rng().gen::<f64>() < self.chance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("http://localhost/");
        if let Some(c) = cookie {
            builder = builder.header("Cookie", c);
        }
        builder.body(Body::default()).unwrap()
    }

    #[test]
    fn test_chance_bounds() {
        let always = TrafficSpec::new().create(&[Arg::Number(1.0)]).unwrap();
        let never = TrafficSpec::new().create(&[Arg::Number(0.0)]).unwrap();
        for _ in 0..100 {
            assert!(always.matches(&request(None)));
            assert!(!never.matches(&request(None)));
        }
    }

    #[test]
    fn test_sticky_cookie() {
        let matcher = TrafficSpec::new()
            .create(&[
                Arg::Number(0.0),
                Arg::String("canary".into()),
                Arg::String("yes".into()),
            ])
            .unwrap();
        assert!(matcher.matches(&request(Some("canary=yes"))));
        assert!(!matcher.matches(&request(Some("canary=no"))));
        assert!(!matcher.matches(&request(None)));
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(TrafficSpec::new().create(&[Arg::Number(1.5)]).is_err());
        assert!(TrafficSpec::new().create(&[Arg::Number(-0.1)]).is_err());
        assert!(TrafficSpec::new()
            .create(&[Arg::Number(0.5), Arg::String("c".into())])
            .is_err());
        assert!(TrafficSpec::new()
            .create(&[Arg::String("half".into())])
            .is_err());
    }
}
