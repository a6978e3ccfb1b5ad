//! Route matcher façade.
//!
//! # Data Flow
//! ```text
//! Options
//!     → validate, open the routes file (fails fast on a bad file)
//!     → predicate registry: bundled, then custom
//!     → filter registry: built-in, then custom and mock filters
//!     → Routing::new → wait_ready
//!     → Matcher
//!
//! Matcher::test(attributes)
//!     → synthesize request → Routing::route → TestResult
//! ```
//!
//! # Design Decisions
//! - "No match" is a result, never an error
//! - A matched route with an empty id counts as no match
//! - The engine is closed when the matcher is dropped

use std::sync::Arc;

use crate::config::validation::validate_options;
use crate::config::{ConfigurationError, Options, RoutesWatcher};
use crate::filters::{self, mock_filters, FilterSpec};
use crate::http::{synthesize, RequestAttributes, UrlError};
use crate::observability::Logger;
use crate::predicates;
use crate::routing::{
    DataClient, EskipFile, MatchingOptions, PredicateRegistry, PredicateSpec, RouteTable,
    Routing, RoutingOptions,
};

pub mod result;

pub use result::TestResult;

/// Tests requests against the routes of one eskip file.
#[derive(Debug)]
pub struct Matcher {
    routing: Routing,
    logger: Logger,
}

impl Matcher {
    /// Build a matcher and wait until its routes are loaded.
    ///
    /// Must be called within a Tokio runtime.
    pub async fn new(options: Options) -> Result<Self, ConfigurationError> {
        validate_options(&options).map_err(ConfigurationError::Validation)?;

        let logger = Logger::new(options.verbose);
        let file = EskipFile::open(&options.routes_file)?;

        let predicates = logger.in_scope(|| predicate_registry(&options))?;
        let filters = logger.in_scope(|| filter_registry(&options));

        let mut routing_options = RoutingOptions::new(vec![Arc::new(file) as Arc<dyn DataClient>]);
        routing_options.predicates = predicates;
        routing_options.filters = filters;
        routing_options.logger = logger.clone();
        routing_options.matching = if options.ignore_trailing_slash {
            MatchingOptions::IGNORE_TRAILING_SLASH
        } else {
            MatchingOptions::NONE
        };

        if options.watch_routes_file {
            let (watcher, reloads) = RoutesWatcher::new(&options.routes_file);
            let handle = logger.in_scope(|| watcher.run())?;
            routing_options.reloads = Some(reloads);
            routing_options.watcher = Some(handle);
        }

        let routing = Routing::new(routing_options);
        routing.wait_ready(options.ready_timeout()).await?;

        Ok(Self { routing, logger })
    }

    /// Find the route matching `attributes`.
    ///
    /// `attributes` are normalized in place: a missing leading slash is
    /// added and an empty method becomes `GET`.
    pub fn test(&self, attributes: &mut RequestAttributes) -> Result<TestResult, UrlError> {
        let request = synthesize(attributes)?;
        let route = self
            .routing
            .route(&request)
            .filter(|route| !route.id.is_empty());

        if route.is_none() {
            self.logger.in_scope(|| {
                tracing::debug!(
                    method = %request.method(),
                    uri = %request.uri(),
                    "No route matched"
                );
            });
        }

        Ok(TestResult::new(route, request, attributes.clone()))
    }

    /// The route table currently in use.
    pub fn routes(&self) -> Arc<RouteTable> {
        self.routing.table()
    }

    /// Receiver of route table generations; changes on every reload.
    pub fn generations(&self) -> tokio::sync::watch::Receiver<u64> {
        self.routing.subscribe()
    }
}

impl Drop for Matcher {
    fn drop(&mut self) {
        self.routing.close();
    }
}

fn predicate_registry(options: &Options) -> Result<PredicateRegistry, ConfigurationError> {
    let mut registry = PredicateRegistry::new();
    for spec in predicates::bundled() {
        registry.register(spec);
    }

    let mut custom = PredicateRegistry::new();
    for spec in &options.custom_predicates {
        if custom.register(spec.clone()).is_some() {
            return Err(ConfigurationError::DuplicatePredicate(spec.name().to_string()));
        }
        if registry.register(spec.clone()).is_some() {
            tracing::debug!(name = spec.name(), "Custom predicate replaces bundled predicate");
        }
    }

    Ok(registry)
}

fn filter_registry(options: &Options) -> filters::Registry {
    let mut registry = filters::Registry::builtin();
    let specs = options
        .custom_filters
        .iter()
        .cloned()
        .chain(mock_filters(&options.mock_filters));
    for spec in specs {
        if registry.register(spec.clone()).is_some() {
            tracing::debug!(name = spec.name(), "Filter replaces built-in filter");
        }
    }
    registry
}
