//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via `tracing`; the request ID set by the HTTP
//!   middleware flows through all per-request events
//! - `RUST_LOG` overrides the configured level
//! - JSON output is opt-in for log aggregation

pub mod logging;

pub use logging::init_logging;
