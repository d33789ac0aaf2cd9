//! # relay-server
//!
//! Axum HTTP + `WebSocket` relay server.
//!
//! - `WebSocket` gateway at `/`: every text message a client sends is
//!   broadcast to every connected client
//! - [`hub`]: the single task that owns the connection registry and
//!   serializes add/remove/broadcast requests
//! - [`session`]: one loop per connection bridging reads into the hub
//! - `GET /health` with the live connection count
//! - Graceful shutdown via `tokio::signal` + `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod health;
pub mod hub;
pub mod server;
pub mod session;
pub mod shutdown;
pub mod websocket;

pub use config::ServerConfig;
pub use hub::{Hub, HubHandle};
pub use server::RelayServer;
