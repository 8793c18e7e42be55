//! Turn-based session server.
//!
//! Spawns a single SessionCoordinator and serves it over WebSocket.

use anyhow::{Context, Error};
use log::info;
use pico_args::Arguments;
use tt_server::{
    api,
    config::{Overrides, ServerConfig},
    logging, metrics,
};
use turn_table::SessionCoordinator;

const HELP: &str = "\
Run a turn-based session server

USAGE:
  tt_server [OPTIONS]

OPTIONS:
  --bind          IP:PORT  Server socket bind address   [default: env SERVER_BIND or 127.0.0.1:6969]
  --metrics-bind  IP:PORT  Prometheus exporter address  [default: env METRICS_BIND or disabled]
  --seats         N        Players needed to start      [default: env SESSION_SEATS or 4]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND                  Server bind address (e.g., 0.0.0.0:8080)
  METRICS_BIND                 Prometheus exporter bind address
  SESSION_SEATS                Players needed to start the game
  SESSION_INBOX_CAPACITY       Coordinator event queue size
  CONNECTION_OUTBOX_CAPACITY   Per-connection outgoing queue size
  RUST_LOG                     Log filter (e.g., debug,tower_http=warn)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = Overrides {
        bind: pargs.opt_value_from_str("--bind")?,
        metrics_bind: pargs.opt_value_from_str("--metrics-bind")?,
        seats: pargs.opt_value_from_str("--seats")?,
    };

    let config = ServerConfig::from_env(overrides)?;
    config.validate()?;

    logging::init();
    info!("Starting session server at {}", config.bind);

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(anyhow::Error::msg)?;
        info!("Prometheus metrics exported on {}", addr);
    }

    let session = SessionCoordinator::spawn(&config.session);
    info!("Session waiting for {} players", config.session.seats);

    let app = api::create_router(api::AppState {
        session: session.clone(),
        outbox_capacity: config.session.outbox_capacity,
    });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");
    let _ = session.shutdown().await;

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
}
