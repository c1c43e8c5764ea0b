//! Routegate binary: load config, compile the route table, serve.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use routegate::config::{load_config, ConfigWatcher, GatewayConfig};
use routegate::http::HttpServer;
use routegate::lifecycle::Shutdown;
use routegate::observability::init_logging;

#[derive(Parser)]
#[command(name = "routegate", version, about = "Path-routing gateway that reports the serving backend's tag")]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the configured bind address (e.g. 127.0.0.1:8080)
    #[arg(short, long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Startup order: config first, then logging, then the listener last so
    // traffic only arrives once routing is ready. A config error aborts the
    // process before anything is bound.
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(listen) = cli.listen {
        config.listener.bind_address = listen;
    }

    init_logging(&config.observability);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        mode = ?config.dispatch.mode,
        "starting routegate"
    );
    if config.routes.is_empty() {
        tracing::warn!("no routes configured; every request will resolve to 404");
    }

    // Hot reload: watch the config file and feed accepted generations to
    // the server. The watcher handle must stay alive for the process.
    let (_watcher, _standalone_tx, config_updates) = match &cli.config {
        Some(path) => {
            let (watcher, rx) = ConfigWatcher::new(path);
            (Some(watcher.run()?), None, rx)
        }
        None => {
            let (tx, rx) = mpsc::unbounded_channel::<GatewayConfig>();
            (None, Some(tx), rx)
        }
    };

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.trigger();
        }
    });

    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config)?;
    let listener = TcpListener::bind(&bind_address).await?;

    server.run(listener, config_updates, shutdown_rx).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
