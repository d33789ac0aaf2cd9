//! Server configuration.

use serde::{Deserialize, Serialize};

/// Default relay port.
pub const DEFAULT_PORT: u16 = 9000;

/// Path the `WebSocket` relay is served on.
pub const RELAY_PATH: &str = "/";

/// Configuration for the relay server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"0.0.0.0"`, all interfaces).
    pub host: String,
    /// Port to bind (default `9000`, `0` to auto-assign).
    pub port: u16,
}

impl ServerConfig {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: DEFAULT_PORT,
        }
    }
}
