//! Route definition model.
//!
//! A route is an identifier, a list of predicate calls, a list of filter
//! calls and a backend. Predicates and filters are kept in the order they
//! were written so that printing a parsed route gives back the same text
//! modulo whitespace.

use std::fmt;

/// A single argument of a predicate or filter call.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Number(f64),
    String(String),
    Regexp(String),
}

impl Arg {
    /// String or regexp payload; numbers yield `None`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Arg::String(s) | Arg::Regexp(s) => Some(s),
            Arg::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Arg::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// A predicate call, e.g. `Path("/foo")`.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub name: String,
    pub args: Vec<Arg>,
}

impl Predicate {
    pub fn new(name: impl Into<String>, args: Vec<Arg>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// A filter call, e.g. `setPath("/")`.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub name: String,
    pub args: Vec<Arg>,
}

impl Filter {
    pub fn new(name: impl Into<String>, args: Vec<Arg>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }
}

/// Where a matched request would be sent.
#[derive(Debug, Clone, PartialEq)]
pub enum Backend {
    /// A network address, e.g. `"https://example.org"`.
    Network(String),
    /// `<shunt>`: the route answers the request itself.
    Shunt,
    /// `<loopback>`: the request is routed again.
    Loopback,
    /// `<dynamic>`: the backend is set by a filter.
    Dynamic,
    /// `<roundRobin, "http://a", "http://b">`.
    LoadBalanced {
        algorithm: Option<String>,
        endpoints: Vec<String>,
    },
}

/// A parsed eskip route.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub id: String,
    pub predicates: Vec<Predicate>,
    pub filters: Vec<Filter>,
    pub backend: Backend,
}

impl Route {
    /// Return the first predicate with the given name.
    pub fn predicate(&self, name: &str) -> Option<&Predicate> {
        self.predicates.iter().find(|p| p.name == name)
    }

    /// Path argument of a `Path` predicate, if any.
    pub fn path(&self) -> Option<&str> {
        self.predicate("Path")
            .and_then(|p| p.args.first())
            .and_then(Arg::as_str)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.print(&super::PrettyPrintInfo::default()))
    }
}
