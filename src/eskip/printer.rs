//! Route definition printing.

use super::route::{Arg, Backend, Filter, Predicate, Route};

/// Controls the layout of a printed route.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PrettyPrintInfo {
    /// Put filters and the backend on their own lines.
    pub pretty: bool,
    /// Indentation used in front of `->` when `pretty` is set.
    pub indent: String,
}

impl PrettyPrintInfo {
    pub fn pretty(indent: impl Into<String>) -> Self {
        Self {
            pretty: true,
            indent: indent.into(),
        }
    }
}

impl Route {
    /// Print the route definition without its id.
    pub fn print(&self, info: &PrettyPrintInfo) -> String {
        let separator = if info.pretty {
            format!("\n{}-> ", info.indent)
        } else {
            " -> ".to_string()
        };

        let mut parts = vec![predicate_string(&self.predicates)];
        parts.extend(self.filters.iter().map(filter_string));
        parts.push(backend_string(&self.backend));
        parts.join(&separator)
    }
}

fn predicate_string(predicates: &[Predicate]) -> String {
    if predicates.is_empty() {
        return "*".to_string();
    }
    predicates
        .iter()
        .map(|p| call_string(&p.name, &p.args))
        .collect::<Vec<_>>()
        .join(" && ")
}

fn filter_string(filter: &Filter) -> String {
    call_string(&filter.name, &filter.args)
}

fn call_string(name: &str, args: &[Arg]) -> String {
    let args = args.iter().map(arg_string).collect::<Vec<_>>().join(", ");
    format!("{}({})", name, args)
}

fn arg_string(arg: &Arg) -> String {
    match arg {
        Arg::Number(n) => n.to_string(),
        Arg::String(s) => quote(s),
        Arg::Regexp(r) => format!("/{}/", r.replace('/', "\\/")),
    }
}

fn backend_string(backend: &Backend) -> String {
    match backend {
        Backend::Network(address) => quote(address),
        Backend::Shunt => "<shunt>".to_string(),
        Backend::Loopback => "<loopback>".to_string(),
        Backend::Dynamic => "<dynamic>".to_string(),
        Backend::LoadBalanced {
            algorithm,
            endpoints,
        } => {
            let mut items: Vec<String> = algorithm.iter().cloned().collect();
            items.extend(endpoints.iter().map(|e| quote(e)));
            format!("<{}>", items.join(", "))
        }
    }
}

fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eskip::parse;

    fn route(input: &str) -> Route {
        parse(input).unwrap().remove(0)
    }

    #[test]
    fn test_print_compact() {
        let definition = r#"Path("/a") && Cookie("c", /^x\/y$/) -> setPath("/") -> "http://b""#;
        let r = route(&format!("r: {}", definition));
        assert_eq!(r.print(&PrettyPrintInfo::default()), definition);
    }

    #[test]
    fn test_print_pretty() {
        let r = route(
            r#"r: Path("/a") -> modPath("^/a", "/b") -> <roundRobin, "http://x", "http://y">"#,
        );
        let expected = concat!(
            "Path(\"/a\")\n",
            "  -> modPath(\"^/a\", \"/b\")\n",
            "  -> <roundRobin, \"http://x\", \"http://y\">",
        );
        assert_eq!(r.print(&PrettyPrintInfo::pretty("  ")), expected);
    }

    #[test]
    fn test_print_any_and_escapes() {
        let r = route(r#"r: * -> inlineContent("say \"hi\"\n", 0.5) -> <shunt>"#);
        assert_eq!(
            r.print(&PrettyPrintInfo::default()),
            r#"* -> inlineContent("say \"hi\"\n", 0.5) -> <shunt>"#
        );
    }

    #[test]
    fn test_display_includes_id() {
        let r = route(r#"home: Path("/") -> <shunt>"#);
        assert_eq!(r.to_string(), r#"home: Path("/") -> <shunt>"#);
    }
}
