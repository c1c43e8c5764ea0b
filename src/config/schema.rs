//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

pub use crate::routing::RouteSpec;

/// Root configuration for the routing gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, connection limits).
    pub listener: ListenerConfig,

    /// Route definitions mapping request paths to server tags.
    pub routes: Vec<RouteSpec>,

    /// Dispatch behavior (resolve-only or forward to live upstreams).
    pub dispatch: DispatchConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// How a matched route is dispatched.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Surface the routing decision as data; no outbound call.
    #[default]
    Resolve,
    /// Forward the request to the upstream registered for the route's tag.
    Forward,
}

/// Dispatch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub mode: DispatchMode,

    /// Upstream call timeout in seconds (forward mode).
    pub timeout_secs: u64,

    /// Upstream registry: one address per server tag.
    pub upstreams: Vec<UpstreamConfig>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            mode: DispatchMode::Resolve,
            timeout_secs: 5,
            upstreams: Vec::new(),
        }
    }
}

/// A live upstream reachable in forward mode.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Server tag this upstream serves.
    pub tag: String,

    /// Base URL (e.g., "http://127.0.0.1:3000").
    pub url: String,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON-formatted logs instead of the human-readable format.
    pub log_json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}
