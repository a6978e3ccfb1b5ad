//! Built-in filter names.
//!
//! Each entry is a filter name with the number of arguments it accepts.
//! The set follows the filters a default skipper registry knows; filters
//! that need external services (token validation, OPA, Lua) are not listed
//! and have to be registered as custom or mock filters.

use std::ops::RangeInclusive;
use std::sync::Arc;

use super::{Filter, FilterError, FilterSpec};
use crate::eskip::Arg;

const ANY: RangeInclusive<usize> = 0..=usize::MAX;

const BUILTIN: &[(&str, RangeInclusive<usize>)] = &[
    // path and query
    ("setPath", 1..=1),
    ("modPath", 2..=2),
    ("setQuery", 1..=2),
    ("dropQuery", 1..=1),
    ("stripQuery", 0..=1),
    ("headerToQuery", 2..=3),
    ("queryToHeader", 2..=3),
    ("rfcPath", 0..=0),
    ("rfcHost", 0..=0),
    // request headers
    ("setRequestHeader", 2..=2),
    ("appendRequestHeader", 2..=2),
    ("dropRequestHeader", 1..=2),
    ("modRequestHeader", 3..=3),
    ("copyRequestHeader", 2..=2),
    ("setContextRequestHeader", 2..=2),
    ("appendContextRequestHeader", 2..=2),
    ("setRequestHeaderFromSecret", 2..=4),
    ("preserveHost", 0..=1),
    ("xforward", 0..=0),
    ("xforwardFirst", 0..=0),
    ("forwardToken", 1..=usize::MAX),
    ("forwardTokenField", 2..=2),
    // response headers
    ("setResponseHeader", 2..=2),
    ("appendResponseHeader", 2..=2),
    ("dropResponseHeader", 1..=2),
    ("modResponseHeader", 3..=3),
    ("copyResponseHeader", 2..=2),
    ("setContextResponseHeader", 2..=2),
    ("appendContextResponseHeader", 2..=2),
    ("corsOrigin", ANY),
    // cookies
    ("requestCookie", 2..=2),
    ("responseCookie", 2..=4),
    ("jsCookie", 2..=4),
    // responses and content
    ("status", 1..=1),
    ("inlineContent", 1..=2),
    ("inlineContentIfStatus", 2..=3),
    ("redirectTo", 1..=2),
    ("redirectToLower", 1..=2),
    ("static", 2..=2),
    ("compress", ANY),
    ("decompress", 0..=0),
    ("randomContent", 1..=1),
    ("repeatContent", 2..=2),
    ("repeatContentHex", 2..=2),
    ("wrapContent", 2..=2),
    ("wrapContentHex", 2..=2),
    ("sed", 2..=3),
    ("sedDelim", 3..=4),
    ("sedRequest", 2..=3),
    ("sedRequestDelim", 3..=4),
    ("loopbackIfStatus", 1..=1),
    // timeouts and diagnostics
    ("backendTimeout", 1..=1),
    ("readTimeout", 1..=1),
    ("writeTimeout", 1..=1),
    ("latency", 1..=1),
    ("bandwidth", 1..=1),
    ("chunks", 2..=2),
    ("backendLatency", 1..=1),
    ("backendBandwidth", 1..=1),
    ("backendChunks", 2..=2),
    ("uniformRequestLatency", 2..=2),
    ("normalRequestLatency", 2..=2),
    ("histogramRequestLatency", 1..=usize::MAX),
    ("uniformResponseLatency", 2..=2),
    ("normalResponseLatency", 2..=2),
    ("histogramResponseLatency", 1..=usize::MAX),
    ("absorb", 0..=0),
    ("absorbSilent", 0..=0),
    ("logHeader", ANY),
    ("logBody", 1..=2),
    // shadow traffic
    ("tee", 1..=3),
    ("teenf", 1..=3),
    ("teeLoopback", 1..=1),
    // access log and auditing
    ("disableAccessLog", ANY),
    ("enableAccessLog", ANY),
    ("maskAccessLogQuery", 1..=usize::MAX),
    ("auditLog", 0..=1),
    ("unverifiedAuditLog", 0..=1),
    // tracing
    ("flowId", 0..=2),
    ("tracingBaggageToTag", 1..=2),
    ("stateBagToTag", 2..=2),
    ("tracingTag", 2..=2),
    ("tracingSpanName", 1..=1),
    ("originMarker", 3..=3),
    ("annotate", 2..=2),
    // authentication
    ("basicAuth", 1..=2),
    ("webhook", 1..=2),
    ("bearerinjector", 1..=1),
    // circuit breakers and rate limits
    ("consecutiveBreaker", 1..=4),
    ("rateBreaker", 2..=5),
    ("disableBreaker", 0..=0),
    ("ratelimit", 2..=3),
    ("clientRatelimit", 2..=3),
    ("clusterRatelimit", 3..=4),
    ("clusterClientRatelimit", 3..=4),
    ("backendRatelimit", 3..=4),
    // concurrency
    ("lifo", 0..=3),
    ("lifoGroup", 1..=1),
    ("fifo", 2..=3),
    ("fifoWithBody", 2..=3),
    // backends and load balancing
    ("setDynamicBackendHost", 1..=1),
    ("setDynamicBackendScheme", 1..=1),
    ("setDynamicBackendUrl", 1..=1),
    ("setDynamicBackendHostFromHeader", 1..=1),
    ("setDynamicBackendSchemeFromHeader", 1..=1),
    ("setDynamicBackendUrlFromHeader", 1..=1),
    ("lbDecide", 2..=2),
    ("fadeIn", 1..=2),
    ("endpointCreated", 2..=2),
    ("consistentHashKey", 1..=1),
    ("consistentHashBalanceFactor", 1..=1),
    ("apiUsageMonitoring", ANY),
];

/// All built-in specs.
pub fn specs() -> Vec<Arc<dyn FilterSpec>> {
    BUILTIN
        .iter()
        .map(|(name, arity)| {
            Arc::new(BuiltinSpec {
                name: *name,
                arity: arity.clone(),
            }) as Arc<dyn FilterSpec>
        })
        .collect()
}

#[derive(Debug)]
struct BuiltinSpec {
    name: &'static str,
    arity: RangeInclusive<usize>,
}

impl FilterSpec for BuiltinSpec {
    fn name(&self) -> &str {
        self.name
    }

    fn create_filter(&self, args: &[Arg]) -> Result<Box<dyn Filter>, FilterError> {
        if !self.arity.contains(&args.len()) {
            let expected = if self.arity.start() == self.arity.end() {
                self.arity.start().to_string()
            } else if *self.arity.end() == usize::MAX {
                format!("at least {}", self.arity.start())
            } else {
                format!("{}..{}", self.arity.start(), self.arity.end())
            };
            return Err(FilterError::ArgumentCount {
                name: self.name.to_string(),
                expected,
                actual: args.len(),
            });
        }
        Ok(Box::new(BuiltinFilter { name: self.name }))
    }
}

#[derive(Debug)]
struct BuiltinFilter {
    name: &'static str,
}

impl Filter for BuiltinFilter {
    fn name(&self) -> &str {
        self.name
    }
}
