//! Shared utilities for integration tests.

use std::net::SocketAddr;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use routegate::config::GatewayConfig;
use routegate::http::HttpServer;
use routegate::lifecycle::Shutdown;
use routegate::routing::RouteSpec;

/// Build a route spec with default priority and no method filter.
pub fn route(pattern: &str, tag: &str) -> RouteSpec {
    RouteSpec {
        pattern: pattern.to_string(),
        tag: tag.to_string(),
        priority: 0,
        methods: Vec::new(),
    }
}

/// Spawn a gateway on an ephemeral port.
///
/// Returns the bound address, the shutdown handle, and the channel used to
/// feed config reloads.
pub async fn spawn_gateway(
    config: GatewayConfig,
) -> (SocketAddr, Shutdown, mpsc::UnboundedSender<GatewayConfig>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let (updates_tx, updates_rx) = mpsc::unbounded_channel();

    let server = HttpServer::new(config).unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener, updates_rx, server_shutdown).await;
    });

    (addr, shutdown, updates_tx)
}

/// Start a simple mock upstream that returns a fixed response.
///
/// Returns the address it is listening on.
#[allow(dead_code)]
pub async fn start_mock_upstream(response: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let response_str = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            response.len(),
                            response
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}
