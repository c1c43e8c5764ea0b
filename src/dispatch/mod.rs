//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Matched Route
//!     → Resolve mode: surface the route's tag as the answer (no I/O)
//!     → Forward mode: one outbound call to the upstream registered for
//!       the tag, original method, bounded timeout
//!     → Dispatched { status, server_tag } or BackendUnavailable
//! ```
//!
//! # Design Decisions
//! - The gateway's contract is the routing decision itself; forwarding is
//!   an extension, not the default
//! - The tag is never substituted: an upstream failure is an error, not a
//!   fallback to a different backend
//! - No route-table reference is held across the outbound await

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use axum::body::Body;
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{Method, Request, StatusCode, Uri};
use hyper::body::Incoming;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use thiserror::Error;
use url::Url;

use crate::config::schema::{DispatchConfig, DispatchMode};
use crate::routing::Route;

/// Outcome of dispatching a matched route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    pub status: StatusCode,
    pub server_tag: String,
}

/// Error raised when a live upstream cannot serve the request.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("upstream for tag `{tag}` unavailable")]
    BackendUnavailable { tag: String },
}

/// Resolves matched routes to a server tag, optionally via a live upstream.
pub struct Dispatcher {
    mode: DispatchMode,
    timeout: Duration,
    /// tag → upstream authority, fixed at startup.
    upstreams: HashMap<String, Authority>,
    client: Client<HttpConnector, Body>,
}

impl Dispatcher {
    /// Build a dispatcher from validated configuration.
    ///
    /// Upstream URLs were checked by config validation; entries that still
    /// fail to parse are skipped with a warning rather than aborting.
    pub fn from_config(config: &DispatchConfig) -> Self {
        let mut upstreams = HashMap::new();
        for upstream in &config.upstreams {
            let authority = Url::parse(&upstream.url)
                .ok()
                .and_then(|url| Authority::from_str(url.authority()).ok());
            match authority {
                Some(authority) => {
                    upstreams.insert(upstream.tag.clone(), authority);
                }
                None => {
                    tracing::warn!(tag = %upstream.tag, url = %upstream.url, "skipping unparseable upstream");
                }
            }
        }

        Self {
            mode: config.mode,
            timeout: Duration::from_secs(config.timeout_secs),
            upstreams,
            client: Client::builder(TokioExecutor::new()).build(HttpConnector::new()),
        }
    }

    /// Dispatch a matched route.
    ///
    /// Resolve mode answers immediately with the route's tag. Forward mode
    /// makes one outbound call per inbound request; any HTTP response from
    /// the upstream counts as served, while connect errors and timeouts
    /// surface as `BackendUnavailable`.
    pub async fn dispatch(
        &self,
        route: &Route,
        method: &Method,
        path_and_query: &str,
    ) -> Result<Dispatched, DispatchError> {
        let tag = route.tag.clone();

        match self.mode {
            DispatchMode::Resolve => Ok(Dispatched {
                status: StatusCode::OK,
                server_tag: tag,
            }),
            DispatchMode::Forward => {
                let authority = self.upstreams.get(&tag).cloned().ok_or_else(|| {
                    tracing::error!(tag = %tag, "no upstream registered for tag");
                    DispatchError::BackendUnavailable { tag: tag.clone() }
                })?;

                let uri = build_upstream_uri(authority, path_and_query).ok_or_else(|| {
                    DispatchError::BackendUnavailable { tag: tag.clone() }
                })?;

                let request = Request::builder()
                    .method(method.clone())
                    .uri(uri)
                    .body(Body::empty())
                    .map_err(|_| DispatchError::BackendUnavailable { tag: tag.clone() })?;

                match tokio::time::timeout(self.timeout, self.client.request(request)).await {
                    Ok(Ok(response)) => {
                        // The upstream body is not relayed; the gateway's
                        // answer is the routing decision.
                        let (parts, _body): (_, Incoming) = response.into_parts();
                        tracing::debug!(
                            tag = %tag,
                            upstream_status = %parts.status,
                            "upstream answered"
                        );
                        Ok(Dispatched {
                            status: StatusCode::OK,
                            server_tag: tag,
                        })
                    }
                    Ok(Err(e)) => {
                        tracing::warn!(tag = %tag, error = %e, "upstream request failed");
                        Err(DispatchError::BackendUnavailable { tag })
                    }
                    Err(_) => {
                        tracing::warn!(tag = %tag, timeout = ?self.timeout, "upstream timed out");
                        Err(DispatchError::BackendUnavailable { tag })
                    }
                }
            }
        }
    }
}

fn build_upstream_uri(authority: Authority, path_and_query: &str) -> Option<Uri> {
    let mut parts = axum::http::uri::Parts::default();
    parts.scheme = Some(Scheme::HTTP);
    parts.authority = Some(authority);
    parts.path_and_query = Some(PathAndQuery::from_str(path_and_query).ok()?);
    Uri::from_parts(parts).ok()
}
