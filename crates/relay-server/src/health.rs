//! `/health`: liveness plus the size of the hub registry.

use std::time::Instant;

use serde::Serialize;

use crate::hub::HubHandle;

/// Body served on `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// `"ok"` while the hub answers, `"hub_stopped"` once it has exited.
    pub status: &'static str,
    /// Whole seconds since the server started.
    pub uptime_secs: u64,
    /// Connections registered with the hub when it answered.
    pub connections: usize,
}

/// Ask the hub for its registry and report on it.
///
/// The snapshot queues behind every request already sent to the hub, so the
/// count reflects all adds and removes issued before the call.
pub async fn report(hub: &HubHandle, start_time: Instant) -> HealthResponse {
    let connections = hub.connections().await.len();
    let status = if hub.is_running() { "ok" } else { "hub_stopped" };
    HealthResponse {
        status,
        uptime_secs: start_time.elapsed().as_secs(),
        connections,
    }
}
