//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, route table compile)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//!
//! On reload:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → new RouteTable generation published atomically
//!     → in-flight requests keep their snapshot
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - A rejected reload never replaces the running configuration

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    DispatchConfig, DispatchMode, GatewayConfig, ListenerConfig, ObservabilityConfig, RouteSpec,
    UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
pub use watcher::ConfigWatcher;
