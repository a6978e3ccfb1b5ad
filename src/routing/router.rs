//! Route lookup and the route table update task.
//!
//! # Responsibilities
//! - Compile loaded routes into matchers, dropping invalid routes
//! - Order routes by priority
//! - Look up the matching route for a request
//! - Publish a readiness signal when a route table is applied
//!
//! # Design Decisions
//! - The table is immutable once built and swapped atomically (lock-free reads)
//! - Explicit `None` rather than a silent default route
//! - Readiness is a generation counter on a watch channel, not a sleep

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::body::Body;
use axum::http::Request;
use notify::RecommendedWatcher;
use regex::Regex;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::instrument::WithSubscriber;

use crate::config::ConfigurationError;
use crate::eskip::{Arg, Route};
use crate::filters::{self, Filter, FilterError};
use crate::lifecycle::{Shutdown, ShutdownSignal};
use crate::observability::Logger;
use crate::routing::matcher::{
    AndMatcher, ConstMatcher, HeaderMatcher, HeaderRegexpMatcher, HostMatcher, MethodMatcher,
    PathMatcher, PathRegexpMatcher, PathSubtreeMatcher, RequestMatcher,
};
use crate::routing::predicate::{args, PredicateError, PredicateRegistry};
use crate::routing::source::{DataClient, SourceError};

/// Path handling switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchingOptions {
    pub ignore_trailing_slash: bool,
}

impl MatchingOptions {
    pub const NONE: Self = Self {
        ignore_trailing_slash: false,
    };

    pub const IGNORE_TRAILING_SLASH: Self = Self {
        ignore_trailing_slash: true,
    };
}

/// Why a loaded route was left out of the table.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("unknown predicate `{0}`")]
    UnknownPredicate(String),

    #[error("unknown filter `{0}`")]
    UnknownFilter(String),

    #[error(transparent)]
    Predicate(#[from] PredicateError),

    #[error(transparent)]
    Filter(#[from] FilterError),
}

/// Everything the engine needs to build and refresh its table.
pub struct RoutingOptions {
    pub data_clients: Vec<Arc<dyn DataClient>>,
    pub predicates: PredicateRegistry,
    pub filters: filters::Registry,
    pub matching: MatchingOptions,
    pub logger: Logger,
    /// Reload signals, e.g. from a routes file watcher.
    pub reloads: Option<mpsc::UnboundedReceiver<()>>,
    /// Kept alive for as long as the engine runs.
    pub watcher: Option<RecommendedWatcher>,
}

impl RoutingOptions {
    pub fn new(data_clients: Vec<Arc<dyn DataClient>>) -> Self {
        Self {
            data_clients,
            predicates: PredicateRegistry::new(),
            filters: filters::Registry::builtin(),
            matching: MatchingOptions::NONE,
            logger: Logger::muted(),
            reloads: None,
            watcher: None,
        }
    }
}

/// Ordering key; higher sorts first.
///
/// Path class: 3 literal `Path`, 2 wildcard `Path`, 1 `PathSubtree`, 0 none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Priority {
    path_class: u8,
    path_len: usize,
    weight: i64,
}

#[derive(Debug)]
struct CompiledRoute {
    route: Arc<Route>,
    matcher: AndMatcher,
    priority: Priority,
    #[allow(dead_code)]
    filters: Vec<Box<dyn Filter>>,
}

/// An immutable, priority-ordered set of compiled routes.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
    generation: u64,
}

impl RouteTable {
    /// Compile routes; invalid routes are returned alongside the table.
    pub fn build(
        routes: Vec<Route>,
        predicates: &PredicateRegistry,
        filters: &filters::Registry,
        matching: MatchingOptions,
        generation: u64,
    ) -> (Self, Vec<(String, RouteError)>) {
        let mut compiled = Vec::with_capacity(routes.len());
        let mut rejected = Vec::new();

        for route in routes {
            match compile(route, predicates, filters, matching) {
                Ok(r) => compiled.push(r),
                Err((id, e)) => rejected.push((id, e)),
            }
        }

        // stable: equal priorities keep file order
        compiled.sort_by(|a, b| b.priority.cmp(&a.priority));

        (
            Self {
                routes: compiled,
                generation,
            },
            rejected,
        )
    }

    /// The highest priority route whose predicates all match.
    pub fn lookup(&self, req: &Request<Body>) -> Option<Arc<Route>> {
        self.routes
            .iter()
            .find(|r| r.matcher.matches(req))
            .map(|r| r.route.clone())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Route ids in lookup order.
    pub fn ids(&self) -> Vec<&str> {
        self.routes.iter().map(|r| r.route.id.as_str()).collect()
    }
}

fn compile(
    route: Route,
    predicates: &PredicateRegistry,
    filters: &filters::Registry,
    matching: MatchingOptions,
) -> Result<CompiledRoute, (String, RouteError)> {
    let id = route.id.clone();
    let fail = |e: RouteError| (id.clone(), e);

    let mut matchers = Vec::with_capacity(route.predicates.len());
    let mut priority = Priority {
        path_class: 0,
        path_len: 0,
        weight: 0,
    };

    for predicate in &route.predicates {
        let name = predicate.name.as_str();
        let values = predicate.args.as_slice();

        let matcher: Box<dyn RequestMatcher> = match name {
            "Path" => {
                args::count(name, values, 1, 1).map_err(|e| fail(e.into()))?;
                let pattern = args::text(name, values, 0).map_err(|e| fail(e.into()))?;
                let matcher = PathMatcher::new(pattern, matching.ignore_trailing_slash);
                let class = if matcher.is_literal() { 3 } else { 2 };
                if class > priority.path_class {
                    priority.path_class = class;
                    priority.path_len = pattern.len();
                }
                Box::new(matcher)
            }
            "PathSubtree" => {
                args::count(name, values, 1, 1).map_err(|e| fail(e.into()))?;
                let prefix = args::text(name, values, 0).map_err(|e| fail(e.into()))?;
                if priority.path_class < 1 {
                    priority.path_class = 1;
                    priority.path_len = prefix.trim_end_matches('/').len();
                }
                Box::new(PathSubtreeMatcher::new(prefix))
            }
            "PathRegexp" => {
                let regex = single_regex(name, values).map_err(|e| fail(e.into()))?;
                Box::new(PathRegexpMatcher::new(regex))
            }
            "Host" => {
                let regex = single_regex(name, values).map_err(|e| fail(e.into()))?;
                Box::new(HostMatcher::new(regex))
            }
            "Method" | "Methods" => {
                let max = if name == "Method" { 1 } else { usize::MAX };
                args::count(name, values, 1, max).map_err(|e| fail(e.into()))?;
                let methods = (0..values.len())
                    .map(|i| args::text(name, values, i).map(str::to_string))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| fail(e.into()))?;
                Box::new(MethodMatcher::new(methods))
            }
            "Header" => {
                args::count(name, values, 2, 2).map_err(|e| fail(e.into()))?;
                let header = args::text(name, values, 0).map_err(|e| fail(e.into()))?;
                let value = args::text(name, values, 1).map_err(|e| fail(e.into()))?;
                Box::new(HeaderMatcher::new(header, value))
            }
            "HeaderRegexp" => {
                args::count(name, values, 2, 2).map_err(|e| fail(e.into()))?;
                let header = args::text(name, values, 0).map_err(|e| fail(e.into()))?;
                let regex = args::regex(name, values, 1).map_err(|e| fail(e.into()))?;
                Box::new(HeaderRegexpMatcher::new(header, regex))
            }
            "Weight" => {
                args::count(name, values, 1, 1).map_err(|e| fail(e.into()))?;
                let weight = args::number(name, values, 0).map_err(|e| fail(e.into()))?;
                priority.weight += weight.round() as i64;
                continue;
            }
            "True" | "False" => {
                args::count(name, values, 0, 0).map_err(|e| fail(e.into()))?;
                Box::new(ConstMatcher::new(name == "True"))
            }
            _ => {
                let spec = predicates
                    .get(name)
                    .ok_or_else(|| fail(RouteError::UnknownPredicate(name.to_string())))?;
                spec.create(values).map_err(|e| fail(e.into()))?
            }
        };
        matchers.push(matcher);
    }

    priority.weight += matchers.len() as i64;

    let filter_instances = route
        .filters
        .iter()
        .map(|f| {
            let spec = filters
                .get(&f.name)
                .ok_or_else(|| RouteError::UnknownFilter(f.name.clone()))?;
            Ok(spec.create_filter(&f.args)?)
        })
        .collect::<Result<Vec<_>, RouteError>>()
        .map_err(fail)?;

    Ok(CompiledRoute {
        route: Arc::new(route),
        matcher: AndMatcher::new(matchers),
        priority,
        filters: filter_instances,
    })
}

fn single_regex(name: &str, values: &[Arg]) -> Result<Regex, PredicateError> {
    args::count(name, values, 1, 1)?;
    args::regex(name, values, 0)
}

/// The routing engine: a route table kept current by a background task.
#[derive(Debug)]
pub struct Routing {
    table: Arc<ArcSwap<RouteTable>>,
    ready: watch::Receiver<u64>,
    shutdown: Shutdown,
    logger: Logger,
}

impl Routing {
    /// Start the engine. Must be called within a Tokio runtime.
    ///
    /// Returns immediately; use [`Routing::wait_ready`] before the first
    /// lookup.
    pub fn new(options: RoutingOptions) -> Self {
        let table = Arc::new(ArcSwap::from_pointee(RouteTable::default()));
        let (ready_tx, ready) = watch::channel(0);
        let shutdown = Shutdown::new();
        let logger = options.logger.clone();

        let task = UpdateTask {
            data_clients: Arc::new(options.data_clients),
            predicates: options.predicates,
            filters: options.filters,
            matching: options.matching,
            table: table.clone(),
            ready: ready_tx,
            generation: 0,
            _watcher: options.watcher,
        };
        let shutdown_rx = shutdown.subscribe();
        tokio::spawn(
            task.run(options.reloads, shutdown_rx)
                .with_subscriber(logger.dispatch().clone()),
        );

        Self {
            table,
            ready,
            shutdown,
            logger,
        }
    }

    /// Wait until the first route table has been applied.
    pub async fn wait_ready(&self, timeout: Duration) -> Result<u64, ConfigurationError> {
        let mut ready = self.ready.clone();
        let applied = tokio::time::timeout(timeout, ready.wait_for(|generation| *generation > 0))
            .await
            .map(|r| r.map(|generation| *generation));
        match applied {
            Ok(Ok(generation)) => Ok(generation),
            Ok(Err(_)) | Err(_) => Err(ConfigurationError::NotReady { timeout }),
        }
    }

    /// Receiver of route table generations, bumped on every applied reload.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.ready.clone()
    }

    /// Find the route for a request, if any.
    pub fn route(&self, req: &Request<Body>) -> Option<Arc<Route>> {
        let table = self.table.load();
        let found = table.lookup(req);
        self.logger.in_scope(|| {
            tracing::trace!(
                method = %req.method(),
                uri = %req.uri(),
                route = found.as_ref().map(|r| r.id.as_str()).unwrap_or("-"),
                generation = table.generation(),
                "Route lookup"
            );
        });
        found
    }

    /// The currently applied route table.
    pub fn table(&self) -> Arc<RouteTable> {
        self.table.load_full()
    }

    /// Stop reloading. Lookups keep using the last table.
    pub fn close(&self) {
        self.shutdown.trigger();
    }
}

struct UpdateTask {
    data_clients: Arc<Vec<Arc<dyn DataClient>>>,
    predicates: PredicateRegistry,
    filters: filters::Registry,
    matching: MatchingOptions,
    table: Arc<ArcSwap<RouteTable>>,
    ready: watch::Sender<u64>,
    generation: u64,
    _watcher: Option<RecommendedWatcher>,
}

impl UpdateTask {
    async fn run(
        mut self,
        reloads: Option<mpsc::UnboundedReceiver<()>>,
        mut shutdown: ShutdownSignal,
    ) {
        self.apply().await;

        let mut reloads = reloads;
        loop {
            let signal = tokio::select! {
                _ = shutdown.recv() => break,
                signal = recv_reload(&mut reloads) => signal,
            };
            match signal {
                Some(()) => self.apply().await,
                None => reloads = None,
            }
        }

        tracing::debug!("Route table updates stopped");
    }

    async fn apply(&mut self) {
        let clients = self.data_clients.clone();
        let loaded = tokio::task::spawn_blocking(move || load_routes(&clients)).await;

        let routes = match loaded {
            Ok(Ok(routes)) => routes,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Failed to load routes. Keeping current route table.");
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, "Route loading task failed");
                return;
            }
        };

        let generation = self.generation + 1;
        let total = routes.len();
        let (table, rejected) = RouteTable::build(
            routes,
            &self.predicates,
            &self.filters,
            self.matching,
            generation,
        );

        for (id, error) in &rejected {
            tracing::warn!(route = %id, error = %error, "Route dropped");
        }
        tracing::info!(
            generation,
            loaded = total,
            active = table.len(),
            dropped = rejected.len(),
            "Route settings applied"
        );

        self.table.store(Arc::new(table));
        self.generation = generation;
        self.ready.send_replace(generation);
    }
}

async fn recv_reload(reloads: &mut Option<mpsc::UnboundedReceiver<()>>) -> Option<()> {
    match reloads {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

fn load_routes(clients: &[Arc<dyn DataClient>]) -> Result<Vec<Route>, SourceError> {
    let mut routes = Vec::new();
    for client in clients {
        routes.extend(client.load_all()?);
    }
    Ok(routes)
}
