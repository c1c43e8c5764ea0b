//! HTTP server setup and the gateway request handler.
//!
//! # Responsibilities
//! - Create the Axum router (health endpoint + gateway fallback handler)
//! - Wire up middleware (request ID, tracing, request timeout)
//! - Resolve each request's path against the active route table snapshot
//! - Dispatch the matched route and answer `{"server_tag": "<tag>"}`
//! - Apply new route table generations arriving from config reloads
//!
//! # Design Decisions
//! - The route table is the only state shared across requests, read through
//!   an ArcSwap snapshot: readers never observe a partially-updated table
//! - Reload publishes a whole new generation; in-flight requests finish on
//!   the snapshot they loaded
//! - A matched route whose method list excludes the request method is
//!   treated as NoMatch

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::dispatch::Dispatcher;
use crate::http::error::GatewayError;
use crate::routing::{LoadError, RouteTable};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Active route table generation, swapped atomically on reload.
    pub table: Arc<ArcSwap<RouteTable>>,
    pub dispatcher: Arc<Dispatcher>,
}

/// HTTP server for the routing gateway.
pub struct HttpServer {
    router: Router,
    table: Arc<ArcSwap<RouteTable>>,
}

impl HttpServer {
    /// Create a new HTTP server from validated configuration.
    ///
    /// Fails with `LoadError` when the route table cannot be built, so a
    /// violated table never serves traffic.
    pub fn new(config: GatewayConfig) -> Result<Self, LoadError> {
        let table = RouteTable::load(&config.routes)?;

        tracing::info!(routes = table.len(), "route table compiled");
        for route in table.routes() {
            tracing::info!(
                pattern = %route.pattern.source(),
                tag = %route.tag,
                priority = route.priority,
                "route"
            );
        }

        let table = Arc::new(ArcSwap::from_pointee(table));
        let state = AppState {
            table: table.clone(),
            dispatcher: Arc::new(Dispatcher::from_config(&config.dispatch)),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, table })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_check))
            .fallback(gateway_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.listener.request_timeout_secs,
                    )))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Route table generations arriving on `config_updates` are published
    /// atomically; the server drains gracefully when `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "gateway listening");

        let table = self.table.clone();
        tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                match RouteTable::load(&new_config.routes) {
                    Ok(new_table) => {
                        tracing::info!(routes = new_table.len(), "new route table generation published");
                        table.store(Arc::new(new_table));
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "reloaded route table rejected, keeping current generation");
                    }
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("shutdown signal received");
            })
            .await?;

        tracing::info!("gateway stopped");
        Ok(())
    }
}

/// Main gateway handler.
///
/// Per-request flow: Received → Matched | Unmatched → Dispatched | Failed
/// → Responded. Exactly one response per request.
async fn gateway_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Response, GatewayError> {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let path = uri.path();

    // Authority-form and other non-origin-form targets are not routable.
    if !path.starts_with('/') {
        return Err(GatewayError::MalformedRequest);
    }

    // One atomic snapshot per request; reloads never tear this view.
    let table = state.table.load_full();

    let matched = table.resolve(path).ok_or_else(|| {
        tracing::debug!(method = %method, path = %path, "no route matched");
        GatewayError::NoMatch
    })?;

    if !matched.route.allows_method(method.as_str()) {
        tracing::debug!(
            method = %method,
            pattern = %matched.route.pattern.source(),
            "method not allowed for matched route"
        );
        return Err(GatewayError::NoMatch);
    }

    tracing::debug!(
        method = %method,
        path = %path,
        pattern = %matched.route.pattern.source(),
        tag = %matched.route.tag,
        params = ?matched.params,
        "route matched"
    );

    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or(path);
    let dispatched = state
        .dispatcher
        .dispatch(matched.route, &method, path_and_query)
        .await?;

    Ok((
        dispatched.status,
        Json(json!({ "server_tag": dispatched.server_tag })),
    )
        .into_response())
}

/// Health check endpoint, outside the configured route table.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RouteSpec;

    fn config_with_routes(routes: Vec<RouteSpec>) -> GatewayConfig {
        GatewayConfig {
            routes,
            ..Default::default()
        }
    }

    #[test]
    fn server_rejects_a_violated_route_table() {
        let config = config_with_routes(vec![
            RouteSpec {
                pattern: "/a/*".to_string(),
                tag: "one".to_string(),
                priority: 0,
                methods: Vec::new(),
            },
            RouteSpec {
                pattern: "/{x}/b".to_string(),
                tag: "two".to_string(),
                priority: 0,
                methods: Vec::new(),
            },
        ]);
        assert!(HttpServer::new(config).is_err());
    }

    #[test]
    fn server_builds_from_a_valid_table() {
        let config = config_with_routes(vec![RouteSpec {
            pattern: "/users".to_string(),
            tag: "svc-users".to_string(),
            priority: 0,
            methods: Vec::new(),
        }]);
        assert!(HttpServer::new(config).is_ok());
    }
}
