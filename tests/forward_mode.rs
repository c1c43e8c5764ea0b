//! Forward-mode tests: one live upstream call per request, 502 on failure.

use routegate::config::{DispatchMode, GatewayConfig, UpstreamConfig};
use serde_json::Value;

mod common;
use common::{route, spawn_gateway, start_mock_upstream};

#[tokio::test]
async fn live_upstream_keeps_the_route_tag() {
    let upstream_addr = start_mock_upstream("hello from upstream").await;

    let mut config = GatewayConfig::default();
    config.routes = vec![route("/users", "svc-users")];
    config.dispatch.mode = DispatchMode::Forward;
    config.dispatch.upstreams = vec![UpstreamConfig {
        tag: "svc-users".to_string(),
        url: format!("http://{}", upstream_addr),
    }];

    let (addr, shutdown, _updates) = spawn_gateway(config).await;

    let res = reqwest::get(format!("http://{}/users", addr)).await.unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    // The tag is the route's tag, never substituted by the upstream.
    assert_eq!(body["server_tag"], "svc-users");

    shutdown.trigger();
}

#[tokio::test]
async fn dead_upstream_is_a_502() {
    // Grab an ephemeral port and release it so nothing is listening there.
    let dead = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = dead.local_addr().unwrap();
    drop(dead);

    let mut config = GatewayConfig::default();
    config.routes = vec![route("/users", "svc-users")];
    config.dispatch.mode = DispatchMode::Forward;
    config.dispatch.timeout_secs = 2;
    config.dispatch.upstreams = vec![UpstreamConfig {
        tag: "svc-users".to_string(),
        url: format!("http://{}", dead_addr),
    }];

    let (addr, shutdown, _updates) = spawn_gateway(config).await;

    let res = reqwest::get(format!("http://{}/users", addr)).await.unwrap();
    assert_eq!(res.status(), 502);
    let body: Value = res.json().await.unwrap();
    assert!(body.get("server_tag").is_none());

    shutdown.trigger();
}
