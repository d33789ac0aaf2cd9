//! # relay-server
//!
//! Relay server binary: accepts `WebSocket` clients and rebroadcasts every
//! message to all of them until Ctrl-C.

#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::Parser;
use relay_server::config::{DEFAULT_PORT, ServerConfig};
use relay_server::server::RelayServer;
use relay_server::shutdown::DEFAULT_SHUTDOWN_TIMEOUT;
use tokio::net::TcpListener;

/// Real-time message relay server.
#[derive(Parser, Debug)]
#[command(name = "relay-server", about = "Real-time WebSocket message relay")]
struct Cli {
    /// Host to bind.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port used for the WebSocket connection.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    relay_core::logging::init_subscriber(&args.log_level);

    let config = ServerConfig {
        host: args.host,
        port: args.port,
    };
    let server = RelayServer::new(config);

    let bind_addr = server.config().bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    tracing::info!(addr = %listener.local_addr()?, "relay server ready");

    let shutdown = server.shutdown().clone();
    let _signal = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("ctrl-c received, shutting down");
                shutdown.shutdown();
            }
            Err(e) => tracing::error!(error = %e, "failed to listen for ctrl-c"),
        }
    });

    let served = server.serve(listener).await;
    let drained = server.drain(Some(DEFAULT_SHUTDOWN_TIMEOUT)).await;
    served.context("Relay server failed")?;
    if !drained {
        tracing::warn!("hub did not drain before timeout");
    }
    tracing::info!("relay server stopped");
    Ok(())
}
