//! Structured logging.
//!
//! # Responsibilities
//! - Provide a per-matcher logger, muted unless verbose
//! - Initialize process-wide logging for the command line tool
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - A matcher logs through its own `Dispatch`, never the global default,
//!   so two matchers in one test binary can log differently
//! - Log level configurable via `RUST_LOG`

use tracing::subscriber::NoSubscriber;
use tracing::Dispatch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_DIRECTIVES: &str = "eskip_matcher=debug";

/// Logger scoped to one matcher.
#[derive(Debug, Clone)]
pub struct Logger {
    dispatch: Dispatch,
}

impl Logger {
    /// Drops every event.
    pub fn muted() -> Self {
        Self {
            dispatch: Dispatch::new(NoSubscriber::default()),
        }
    }

    /// Writes events to stderr, filtered by `RUST_LOG` when set.
    pub fn verbose() -> Self {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_DIRECTIVES.into()),
            )
            .with_writer(std::io::stderr)
            .finish();
        Self {
            dispatch: Dispatch::new(subscriber),
        }
    }

    pub fn new(verbose: bool) -> Self {
        if verbose {
            Self::verbose()
        } else {
            Self::muted()
        }
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Run `f` with this logger as the current subscriber.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::muted()
    }
}

/// Install the global subscriber used by the command line tool.
pub fn init(verbose: bool) {
    let fallback = if verbose { DEFAULT_DIRECTIVES } else { "eskip_matcher=warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
