//! `RelayServer`: the Axum HTTP and `WebSocket` front end.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::{RELAY_PATH, ServerConfig};
use crate::health::{self, HealthResponse};
use crate::hub::{Hub, HubHandle};
use crate::session::run_session;
use crate::shutdown::ShutdownCoordinator;
use crate::websocket::split_socket;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Request side of the process-wide hub.
    pub hub: HubHandle,
    /// Signals server shutdown to new and running sessions.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// When the server started.
    pub start_time: Instant,
}

/// The relay server.
///
/// Owns the one hub for the whole process. Sessions for every accepted
/// connection share it.
pub struct RelayServer {
    config: ServerConfig,
    hub: HubHandle,
    hub_task: JoinHandle<()>,
    shutdown: Arc<ShutdownCoordinator>,
    start_time: Instant,
}

impl RelayServer {
    /// Create a server and start its hub. Must be called inside a Tokio runtime.
    pub fn new(config: ServerConfig) -> Self {
        let (hub, hub_task) = Hub::spawn();
        Self {
            config,
            hub,
            hub_task,
            shutdown: Arc::new(ShutdownCoordinator::new()),
            start_time: Instant::now(),
        }
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            hub: self.hub.clone(),
            shutdown: Arc::clone(&self.shutdown),
            start_time: self.start_time,
        };

        Router::new()
            .route(RELAY_PATH, get(ws_handler))
            .route("/health", get(health_handler))
            .with_state(state)
    }

    /// Serve on `listener` until shutdown is signalled or the listener fails.
    pub async fn serve(&self, listener: TcpListener) -> std::io::Result<()> {
        serve_router(listener, self.router(), self.shutdown.token()).await
    }

    /// Bind the configured address and serve on a background task.
    ///
    /// Returns the bound address (useful with port `0`) and the serve task.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        let addr = listener.local_addr()?;
        info!(%addr, "relay listening");

        let router = self.router();
        let token = self.shutdown.token();
        let handle = tokio::spawn(async move {
            if let Err(e) = serve_router(listener, router, token).await {
                error!(error = %e, "relay server failed");
            }
        });
        Ok((addr, handle))
    }

    /// Signal shutdown and wait for the hub to drain.
    ///
    /// Sessions deregister as they observe the signal; the hub exits once the
    /// last of them has let go of its handle.
    pub async fn drain(self, timeout: Option<Duration>) -> bool {
        let Self {
            hub,
            hub_task,
            shutdown,
            ..
        } = self;
        shutdown.shutdown();
        drop(hub);
        shutdown.drain(vec![hub_task], timeout).await
    }

    /// Request side of the hub.
    pub fn hub(&self) -> &HubHandle {
        &self.hub
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

async fn serve_router(
    listener: TcpListener,
    router: Router,
    token: CancellationToken,
) -> std::io::Result<()> {
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(token.cancelled_owned())
    .await
}

/// GET /: upgrade to a relay `WebSocket`. Refused once shutdown has begun.
async fn ws_handler(
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    if state.shutdown.is_shutting_down() {
        debug!(%remote, "refusing connection during shutdown");
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    match ws {
        Ok(ws) => ws.on_upgrade(move |socket| handle_socket(socket, remote, state)),
        Err(rejection) => rejection.into_response(),
    }
}

async fn handle_socket(socket: WebSocket, remote: SocketAddr, state: AppState) {
    info!(%remote, "client connected");
    let (source, sink) = split_socket(socket, remote);
    let end = run_session(source, sink, state.hub, state.shutdown.token()).await;
    debug!(%remote, ?end, "client session finished");
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::report(&state.hub, state.start_time).await)
}
