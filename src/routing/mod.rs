//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → table.rs (resolve against the active generation)
//!     → pattern.rs (evaluate compiled segments)
//!     → Return: matched Route + params, or NoMatch
//!
//! Route Compilation (at startup/reload):
//!     RouteSpec[]
//!     → Compile patterns (segment AST, no regex)
//!     → Reject duplicates and ambiguous overlaps
//!     → Sort by (exactness, specificity, priority)
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at load time, immutable at runtime
//! - Exact match beats any wildcard; more literal segments beat fewer;
//!   explicit priority breaks the rest
//! - Deterministic: same (table, path) always resolves the same route
//! - Ambiguity is rejected when the table is built, not at match time

pub mod pattern;
pub mod table;

pub use pattern::{PathParams, Pattern, PatternError};
pub use table::{LoadError, Route, RouteMatch, RouteSpec, RouteTable};
