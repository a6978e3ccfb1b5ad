//! `Between`, `Before` and `After` time predicates.
//!
//! Times are unix seconds (numbers) or RFC 3339 strings. `Between` is a
//! half-open interval: the start is included, the end is not.

use axum::body::Body;
use axum::http::Request;
use chrono::{DateTime, TimeZone, Utc};

use crate::eskip::Arg;
use crate::routing::matcher::RequestMatcher;
use crate::routing::predicate::{args, PredicateError, PredicateSpec};

/// Source of the current time.
pub type Clock = fn() -> DateTime<Utc>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Between,
    Before,
    After,
}

#[derive(Debug, Clone)]
pub struct IntervalSpec {
    kind: Kind,
    clock: Clock,
}

impl IntervalSpec {
    pub fn between() -> Self {
        Self::with_clock(Kind::Between, Utc::now)
    }

    pub fn before() -> Self {
        Self::with_clock(Kind::Before, Utc::now)
    }

    pub fn after() -> Self {
        Self::with_clock(Kind::After, Utc::now)
    }

    fn with_clock(kind: Kind, clock: Clock) -> Self {
        Self { kind, clock }
    }

    fn time_arg(&self, values: &[Arg], index: usize) -> Result<DateTime<Utc>, PredicateError> {
        let invalid = |reason: String| PredicateError::InvalidArgument {
            name: self.name().to_string(),
            reason,
        };

        match values.get(index) {
            Some(Arg::Number(secs)) => {
                let whole = secs.trunc() as i64;
                let nanos = (secs.fract() * 1e9) as u32;
                Utc.timestamp_opt(whole, nanos)
                    .single()
                    .ok_or_else(|| invalid(format!("{} is out of range", secs)))
            }
            Some(Arg::String(text)) => DateTime::parse_from_rfc3339(text)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| invalid(format!("`{}`: {}", text, e))),
            _ => Err(PredicateError::ArgumentType {
                name: self.name().to_string(),
                index,
                expected: "a unix timestamp or an RFC 3339 date",
            }),
        }
    }
}

impl PredicateSpec for IntervalSpec {
    fn name(&self) -> &str {
        match self.kind {
            Kind::Between => "Between",
            Kind::Before => "Before",
            Kind::After => "After",
        }
    }

    fn create(&self, values: &[Arg]) -> Result<Box<dyn RequestMatcher>, PredicateError> {
        let (begin, end) = match self.kind {
            Kind::Between => {
                args::count(self.name(), values, 2, 2)?;
                let begin = self.time_arg(values, 0)?;
                let end = self.time_arg(values, 1)?;
                if begin >= end {
                    return Err(PredicateError::InvalidArgument {
                        name: self.name().to_string(),
                        reason: "the start must be before the end".to_string(),
                    });
                }
                (Some(begin), Some(end))
            }
            Kind::Before => {
                args::count(self.name(), values, 1, 1)?;
                (None, Some(self.time_arg(values, 0)?))
            }
            Kind::After => {
                args::count(self.name(), values, 1, 1)?;
                (Some(self.time_arg(values, 0)?), None)
            }
        };

        Ok(Box::new(IntervalMatcher {
            begin,
            end,
            clock: self.clock,
        }))
    }
}

#[derive(Debug)]
struct IntervalMatcher {
    begin: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    clock: Clock,
}

impl RequestMatcher for IntervalMatcher {
    fn matches(&self, _req: &Request<Body>) -> bool {
        let now = (self.clock)();
        self.begin.map_or(true, |b| now >= b) && self.end.map_or(true, |e| now < e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2020-06-01T12:00:00Z
    fn fixed_now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_591_012_800, 0).unwrap()
    }

    fn request() -> Request<Body> {
        Request::builder()
            .uri("http://localhost/")
            .body(Body::default())
            .unwrap()
    }

    #[test]
    fn test_between() {
        let spec = IntervalSpec::with_clock(Kind::Between, fixed_now);
        let inside = spec
            .create(&[
                Arg::String("2020-06-01T00:00:00Z".into()),
                Arg::String("2020-06-02T00:00:00+00:00".into()),
            ])
            .unwrap();
        assert!(inside.matches(&request()));

        let end_excluded = spec
            .create(&[Arg::Number(1_591_000_000.0), Arg::Number(1_591_012_800.0)])
            .unwrap();
        assert!(!end_excluded.matches(&request()));

        let start_included = spec
            .create(&[Arg::Number(1_591_012_800.0), Arg::Number(1_591_099_200.0)])
            .unwrap();
        assert!(start_included.matches(&request()));
    }

    #[test]
    fn test_before_after() {
        let before = IntervalSpec::with_clock(Kind::Before, fixed_now)
            .create(&[Arg::String("2021-01-01T00:00:00Z".into())])
            .unwrap();
        assert!(before.matches(&request()));

        let after = IntervalSpec::with_clock(Kind::After, fixed_now)
            .create(&[Arg::String("2021-01-01T00:00:00Z".into())])
            .unwrap();
        assert!(!after.matches(&request()));
    }

    #[test]
    fn test_invalid_arguments() {
        let between = IntervalSpec::between();
        assert!(between.create(&[Arg::Number(10.0)]).is_err());
        assert!(between
            .create(&[Arg::Number(20.0), Arg::Number(10.0)])
            .is_err());
        assert!(IntervalSpec::after()
            .create(&[Arg::String("yesterday".into())])
            .is_err());
        assert!(IntervalSpec::before()
            .create(&[Arg::Regexp("2020".into())])
            .is_err());
    }
}
