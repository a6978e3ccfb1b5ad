//! Recursive-descent parser for eskip documents.

use std::collections::HashSet;

use thiserror::Error;

use super::lexer::{tokenize, Spanned, Token};
use super::route::{Arg, Backend, Filter, Predicate, Route};

/// A syntax error with the position where it was detected.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}, column {column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

/// Parse an eskip document into routes.
///
/// A document holding a single route may omit the route id; with more than
/// one route every route must be named and names must be unique.
pub fn parse(input: &str) -> Result<Vec<Route>, ParseError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        position: 0,
    };
    parser.document()
}

struct Parser {
    tokens: Vec<Spanned>,
    position: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position).map(|s| &s.token)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.position + offset).map(|s| &s.token)
    }

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        let message = message.into();
        match self.tokens.get(self.position) {
            Some(s) => ParseError::new(
                s.line,
                s.column,
                format!("{}, found {}", message, s.token.describe()),
            ),
            None => {
                let (line, column) = self
                    .tokens
                    .last()
                    .map(|s| (s.line, s.column))
                    .unwrap_or((1, 1));
                ParseError::new(line, column, format!("{}, found end of input", message))
            }
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if self.peek() == Some(&expected) {
            self.position += 1;
            Ok(())
        } else {
            Err(self.error_here(format!("expected {}", expected.describe())))
        }
    }

    fn document(&mut self) -> Result<Vec<Route>, ParseError> {
        let mut routes = Vec::new();
        let mut ids = HashSet::new();

        while self.peek().is_some() {
            let start = self.tokens[self.position].clone();
            let route = self.route()?;

            if !route.id.is_empty() && !ids.insert(route.id.clone()) {
                return Err(ParseError::new(
                    start.line,
                    start.column,
                    format!("duplicate route id `{}`", route.id),
                ));
            }
            routes.push(route);

            match self.peek() {
                Some(Token::Semicolon) => {
                    self.position += 1;
                }
                None => break,
                Some(_) => return Err(self.error_here("expected `;` between routes")),
            }
        }

        if routes.len() > 1 {
            if let Some(position) = routes.iter().position(|r| r.id.is_empty()) {
                return Err(ParseError::new(
                    1,
                    1,
                    format!(
                        "route #{} has no id; ids are required when defining several routes",
                        position + 1
                    ),
                ));
            }
        }

        Ok(routes)
    }

    fn route(&mut self) -> Result<Route, ParseError> {
        let id = match (self.peek(), self.peek_at(1)) {
            (Some(Token::Ident(id)), Some(Token::Colon)) => {
                let id = id.clone();
                self.position += 2;
                id
            }
            _ => String::new(),
        };

        let predicates = self.predicates()?;
        let mut filters = Vec::new();

        loop {
            self.expect(Token::Arrow)?;
            match self.peek() {
                Some(Token::Ident(_)) => {
                    let (name, args) = self.call()?;
                    filters.push(Filter::new(name, args));
                }
                _ => {
                    let backend = self.backend()?;
                    return Ok(Route {
                        id,
                        predicates,
                        filters,
                        backend,
                    });
                }
            }
        }
    }

    fn predicates(&mut self) -> Result<Vec<Predicate>, ParseError> {
        if self.peek() == Some(&Token::Any) {
            self.position += 1;
            return Ok(Vec::new());
        }

        let mut predicates = Vec::new();
        loop {
            let (name, args) = self.call()?;
            predicates.push(Predicate::new(name, args));
            if self.peek() == Some(&Token::And) {
                self.position += 1;
            } else {
                return Ok(predicates);
            }
        }
    }

    fn call(&mut self) -> Result<(String, Vec<Arg>), ParseError> {
        let name = match self.peek() {
            Some(Token::Ident(name)) => name.clone(),
            _ => return Err(self.error_here("expected a predicate or filter name")),
        };
        self.position += 1;
        self.expect(Token::OpenParen)?;

        let mut args = Vec::new();
        if self.peek() == Some(&Token::CloseParen) {
            self.position += 1;
            return Ok((name, args));
        }

        loop {
            let arg = match self.peek() {
                Some(Token::Number(n)) => Arg::Number(*n),
                Some(Token::Str(s)) => Arg::String(s.clone()),
                Some(Token::Regexp(r)) => Arg::Regexp(r.clone()),
                _ => return Err(self.error_here("expected a number, string or regexp argument")),
            };
            self.position += 1;
            args.push(arg);

            match self.peek() {
                Some(Token::Comma) => self.position += 1,
                Some(Token::CloseParen) => {
                    self.position += 1;
                    return Ok((name, args));
                }
                _ => return Err(self.error_here("expected `,` or `)`")),
            }
        }
    }

    fn backend(&mut self) -> Result<Backend, ParseError> {
        match self.peek() {
            Some(Token::Str(address)) => {
                let backend = Backend::Network(address.clone());
                self.position += 1;
                Ok(backend)
            }
            Some(Token::OpenAngle) => {
                self.position += 1;
                self.special_backend()
            }
            _ => Err(self.error_here("expected a backend")),
        }
    }

    fn special_backend(&mut self) -> Result<Backend, ParseError> {
        let mut algorithm = None;

        if let Some(Token::Ident(name)) = self.peek() {
            let name = name.clone();
            self.position += 1;
            match (name.as_str(), self.peek()) {
                ("shunt", Some(Token::CloseAngle)) => {
                    self.position += 1;
                    return Ok(Backend::Shunt);
                }
                ("loopback", Some(Token::CloseAngle)) => {
                    self.position += 1;
                    return Ok(Backend::Loopback);
                }
                ("dynamic", Some(Token::CloseAngle)) => {
                    self.position += 1;
                    return Ok(Backend::Dynamic);
                }
                _ => {
                    self.expect(Token::Comma)?;
                    algorithm = Some(name);
                }
            }
        }

        let mut endpoints = Vec::new();
        loop {
            match self.peek() {
                Some(Token::Str(endpoint)) => {
                    endpoints.push(endpoint.clone());
                    self.position += 1;
                }
                _ => return Err(self.error_here("expected a quoted endpoint")),
            }
            match self.peek() {
                Some(Token::Comma) => self.position += 1,
                Some(Token::CloseAngle) => {
                    self.position += 1;
                    return Ok(Backend::LoadBalanced {
                        algorithm,
                        endpoints,
                    });
                }
                _ => return Err(self.error_here("expected `,` or `>`")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document() {
        let routes = parse(
            r#"
            // greeting
            hello: Path("/hello") && Method("GET")
              -> setRequestHeader("X-Greeting", "hi")
              -> "https://hello.example.org";

            catchAll: * -> status(404) -> <shunt>;
            "#,
        )
        .unwrap();

        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].id, "hello");
        assert_eq!(routes[0].path(), Some("/hello"));
        assert_eq!(routes[0].filters[0].name, "setRequestHeader");
        assert_eq!(
            routes[0].backend,
            Backend::Network("https://hello.example.org".into())
        );
        assert!(routes[1].predicates.is_empty());
        assert_eq!(routes[1].filters[0].args, vec![Arg::Number(404.0)]);
        assert_eq!(routes[1].backend, Backend::Shunt);
    }

    #[test]
    fn test_load_balanced_backend() {
        let routes = parse(r#"lb: * -> <roundRobin, "http://a", "http://b">"#).unwrap();
        assert_eq!(
            routes[0].backend,
            Backend::LoadBalanced {
                algorithm: Some("roundRobin".into()),
                endpoints: vec!["http://a".into(), "http://b".into()],
            }
        );

        let routes = parse(r#"lb: * -> <"http://a">"#).unwrap();
        assert!(matches!(
            &routes[0].backend,
            Backend::LoadBalanced { algorithm: None, endpoints } if endpoints.len() == 1
        ));
    }

    #[test]
    fn test_single_anonymous_route() {
        let routes = parse(r#"Path("/") -> <loopback>"#).unwrap();
        assert_eq!(routes[0].id, "");
        assert_eq!(routes[0].backend, Backend::Loopback);
    }

    #[test]
    fn test_anonymous_route_among_many() {
        let err = parse(r#"a: * -> <shunt>; * -> <shunt>"#).unwrap_err();
        assert!(err.message.contains("has no id"));
    }

    #[test]
    fn test_duplicate_id() {
        let err = parse(r#"a: * -> <shunt>; a: * -> <dynamic>"#).unwrap_err();
        assert!(err.message.contains("duplicate route id `a`"));
    }

    #[test]
    fn test_missing_backend() {
        let err = parse(r#"a: Path("/a") -> setPath("/b")"#).unwrap_err();
        assert!(err.message.starts_with("expected `->`"));
    }

    #[test]
    fn test_error_position() {
        let err = parse("a: Path(\"/a\")\n  -> ;").unwrap_err();
        assert_eq!((err.line, err.column), (2, 6));
    }

    #[test]
    fn test_empty_document() {
        assert!(parse("  // nothing here\n").unwrap().is_empty());
    }
}
