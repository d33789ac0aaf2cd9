//! # relay-client
//!
//! Connects to a relay server, sends each non-empty stdin line, and prints
//! every relayed message to stdout.

#![deny(unsafe_code)]

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use relay_client::{ClientConfig, ClientExit};
use tokio::io::BufReader;

/// Real-time message relay client.
#[derive(Parser, Debug)]
#[command(name = "relay-client", about = "Chat through a WebSocket message relay")]
struct Cli {
    /// Server host.
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Port used for the WebSocket connection.
    #[arg(long, default_value_t = 9000)]
    port: u16,

    /// Default log filter when `RUST_LOG` is unset. Logs go to stderr.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    relay_core::logging::init_subscriber(&args.log_level);

    let config = ClientConfig {
        host: args.host,
        port: args.port,
        ..ClientConfig::default()
    };

    let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
    let result = runtime.block_on(run(config));
    // Stdin is read on a blocking thread that never finishes on its own
    runtime.shutdown_timeout(Duration::from_millis(100));

    match result? {
        ClientExit::InputExhausted => tracing::debug!("input exhausted"),
        ClientExit::ConnectionClosed => tracing::info!("connection closed by server"),
    }
    Ok(())
}

async fn run(config: ClientConfig) -> Result<ClientExit> {
    let ws = relay_client::connect(&config)
        .await
        .context("Failed to connect")?;
    let input = BufReader::new(tokio::io::stdin());
    let exit = relay_client::relay(ws, input, tokio::io::stdout())
        .await
        .context("Relay connection failed")?;
    Ok(exit)
}
