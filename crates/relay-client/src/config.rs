//! Client configuration.

use serde::{Deserialize, Serialize};

/// Where the client connects.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server host (default `"localhost"`).
    pub host: String,
    /// Server port (default `9000`).
    pub port: u16,
    /// Relay path on the server (default `"/"`).
    pub path: String,
}

impl ClientConfig {
    /// `ws://` URL for this configuration.
    pub fn url(&self) -> String {
        format!("ws://{}:{}{}", self.host, self.port, self.path)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 9000,
            path: "/".into(),
        }
    }
}
