//! eskip-matcher: report which route of an eskip file matches a request.
//!
//! ```text
//! eskip-matcher --routes routes.eskip --path /api/users -H "Cookie: session=1"
//! ```
//!
//! Exit codes: 0 match, 1 no match, 2 error.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use eskip_matcher::config::load_options;
use eskip_matcher::observability::logging;
use eskip_matcher::{Matcher, Options, RequestAttributes};

#[derive(Parser)]
#[command(name = "eskip-matcher")]
#[command(about = "Test which eskip route matches a request", long_about = None)]
struct Cli {
    /// Routes file
    #[arg(short, long, conflicts_with = "config", required_unless_present = "config")]
    routes: Option<PathBuf>,

    /// Options file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, default_value = "")]
    method: String,

    #[arg(short, long, default_value = "/")]
    path: String,

    /// Request header, `name:value`; repeatable
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Register a filter that accepts any arguments; repeatable
    #[arg(long = "mock-filter")]
    mock_filters: Vec<String>,

    #[arg(long)]
    ignore_trailing_slash: bool,

    /// Log engine activity to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once(':')
        .ok_or_else(|| format!("expected `name:value`, got `{}`", s))?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(false);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let mut options = match (&cli.config, &cli.routes) {
        (Some(config), _) => load_options(config)?,
        (None, Some(routes)) => Options::new(routes),
        (None, None) => return Err("either --routes or --config is required".into()),
    };
    options.mock_filters.extend(cli.mock_filters);
    options.ignore_trailing_slash |= cli.ignore_trailing_slash;
    options.verbose |= cli.verbose;
    options.watch_routes_file = false;

    tracing::debug!(routes_file = %options.routes_file.display(), "Building matcher");
    let matcher = Matcher::new(options).await?;

    let mut attributes = RequestAttributes::new(cli.method, cli.path);
    attributes.headers.extend(cli.headers);
    let result = matcher.test(&mut attributes)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.is_match() {
        print!("{}", result.pretty_print_route());
    } else {
        println!("no match");
    }

    Ok(result.is_match())
}
