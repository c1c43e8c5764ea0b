//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Compile the route table so malformed or ambiguous routes are rejected
//!   before the gateway serves traffic
//! - Check referential integrity (forward mode: every route tag has an
//!   upstream, every upstream URL parses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before a config is accepted into the system, at startup and reload

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{DispatchMode, GatewayConfig};
use crate::routing::{LoadError, RouteTable};

/// A single semantic problem found in a configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid bind address `{0}`")]
    InvalidBindAddress(String),
    #[error("route table rejected: {0}")]
    Routes(#[from] LoadError),
    #[error("forward mode: no upstream registered for tag `{0}`")]
    MissingUpstream(String),
    #[error("upstream for tag `{tag}` has an invalid url `{url}`")]
    InvalidUpstreamUrl { tag: String, url: String },
    #[error("duplicate upstream for tag `{0}`")]
    DuplicateUpstream(String),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if let Err(e) = RouteTable::load(&config.routes) {
        errors.push(ValidationError::Routes(e));
    }

    let mut seen = HashSet::new();
    for upstream in &config.dispatch.upstreams {
        if !seen.insert(upstream.tag.as_str()) {
            errors.push(ValidationError::DuplicateUpstream(upstream.tag.clone()));
        }
        if Url::parse(&upstream.url).is_err() {
            errors.push(ValidationError::InvalidUpstreamUrl {
                tag: upstream.tag.clone(),
                url: upstream.url.clone(),
            });
        }
    }

    if config.dispatch.mode == DispatchMode::Forward {
        for route in &config.routes {
            if !seen.contains(route.tag.as_str()) {
                errors.push(ValidationError::MissingUpstream(route.tag.clone()));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::UpstreamConfig;
    use crate::routing::RouteSpec;

    fn route(pattern: &str, tag: &str) -> RouteSpec {
        RouteSpec {
            pattern: pattern.to_string(),
            tag: tag.to_string(),
            priority: 0,
            methods: Vec::new(),
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn bad_bind_address_is_reported() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidBindAddress(_))));
    }

    #[test]
    fn ambiguous_routes_fail_validation() {
        let mut config = GatewayConfig::default();
        config.routes = vec![route("/a/*", "one"), route("/{x}/b", "two")];
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::Routes(LoadError::AmbiguousRoutes { .. }))));
    }

    #[test]
    fn forward_mode_requires_an_upstream_per_tag() {
        let mut config = GatewayConfig::default();
        config.routes = vec![route("/users", "svc-users")];
        config.dispatch.mode = DispatchMode::Forward;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::MissingUpstream(_))));

        config.dispatch.upstreams = vec![UpstreamConfig {
            tag: "svc-users".to_string(),
            url: "http://127.0.0.1:3000".to_string(),
        }];
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "nope".to_string();
        config.routes = vec![route("bad-pattern", "t")];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
