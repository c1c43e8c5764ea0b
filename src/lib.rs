//! Routegate — a request-routing gateway.
//!
//! Inspects an incoming request's path, selects a backend according to a
//! compiled route table, and answers with the identity of the backend that
//! would handle the request: `{"server_tag": "<tag>"}`.

pub mod config;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::RouteTable;
