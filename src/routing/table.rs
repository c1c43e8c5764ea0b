//! Route table construction and lookup.
//!
//! # Data Flow
//! ```text
//! RouteSpec[] (from config)
//!     → compile patterns
//!     → reject duplicates and ambiguous overlaps
//!     → sort by (exactness, specificity, priority)
//!     → freeze as an immutable RouteTable generation
//!
//! Per request:
//!     resolve(path) → first matching route or NoMatch
//! ```
//!
//! # Design Decisions
//! - Tables are immutable once loaded; a reload builds a new generation
//! - Ambiguous tie-breaks are a load-time error, never a runtime condition
//! - Resolution is a first-hit scan over pre-sorted routes, so the same
//!   (table, path) always yields the same route

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::routing::pattern::{PathParams, Pattern, PatternError};

/// A route rule as written in configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteSpec {
    /// Path pattern: literal segments, `*`, `{name}`, trailing `**`.
    pub pattern: String,

    /// Opaque identifier of the backend that owns this route.
    pub tag: String,

    /// Tie-break between overlapping patterns of equal specificity
    /// (higher wins).
    #[serde(default)]
    pub priority: u32,

    /// Allowed methods; empty means all methods.
    #[serde(default)]
    pub methods: Vec<String>,
}

/// Error raised when a route table cannot be built.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: PatternError,
    },
    #[error("duplicate pattern `{0}`")]
    DuplicatePattern(String),
    #[error("ambiguous routes `{first}` and `{second}`: overlapping patterns with equal specificity and priority")]
    AmbiguousRoutes { first: String, second: String },
    #[error("route `{0}` has an empty tag")]
    EmptyTag(String),
}

/// A compiled route.
#[derive(Debug, Clone)]
pub struct Route {
    pub pattern: Pattern,
    pub tag: String,
    pub priority: u32,
    methods: Vec<String>,
}

impl Route {
    /// True when this route accepts the given method.
    pub fn allows_method(&self, method: &str) -> bool {
        self.methods.is_empty() || self.methods.iter().any(|m| m.eq_ignore_ascii_case(method))
    }
}

/// A successful resolution.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: PathParams,
}

/// One immutable generation of compiled routes.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Compile and validate a set of route specs into a table.
    ///
    /// Rejects malformed patterns, duplicate patterns, empty tags, and any
    /// pair of overlapping patterns that would tie at match time (equal
    /// specificity and equal priority).
    pub fn load(specs: &[RouteSpec]) -> Result<Self, LoadError> {
        let mut routes = Vec::with_capacity(specs.len());

        for spec in specs {
            if spec.tag.is_empty() {
                return Err(LoadError::EmptyTag(spec.pattern.clone()));
            }
            let pattern =
                Pattern::parse(&spec.pattern).map_err(|source| LoadError::InvalidPattern {
                    pattern: spec.pattern.clone(),
                    source,
                })?;
            routes.push(Route {
                pattern,
                tag: spec.tag.clone(),
                priority: spec.priority,
                methods: spec.methods.clone(),
            });
        }

        for (i, a) in routes.iter().enumerate() {
            for b in &routes[i + 1..] {
                if a.pattern == b.pattern {
                    return Err(LoadError::DuplicatePattern(a.pattern.source().to_string()));
                }
                let ties = a.pattern.is_exact() == b.pattern.is_exact()
                    && a.pattern.specificity() == b.pattern.specificity()
                    && a.priority == b.priority;
                if ties && a.pattern.overlaps(&b.pattern) {
                    return Err(LoadError::AmbiguousRoutes {
                        first: a.pattern.source().to_string(),
                        second: b.pattern.source().to_string(),
                    });
                }
            }
        }

        // Most specific first: exact routes, then by literal segment count,
        // then by explicit priority. After the checks above, overlapping
        // routes are strictly ordered by this key.
        routes.sort_by(|a, b| {
            b.pattern
                .is_exact()
                .cmp(&a.pattern.is_exact())
                .then(b.pattern.specificity().cmp(&a.pattern.specificity()))
                .then(b.priority.cmp(&a.priority))
        });

        Ok(Self { routes })
    }

    /// Resolve a request path to the best-matching route.
    ///
    /// Pure function of (table, path); returns `None` when no route matches.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        for route in &self.routes {
            if let Some(params) = route.pattern.matches(path) {
                return Some(RouteMatch { route, params });
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Compiled routes in match order, for startup logging.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}
