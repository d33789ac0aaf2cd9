//! Per-connection session loop. Bridges one peer's reads into the hub.

use std::sync::Arc;

use relay_core::{Message, MessageSink, MessageSource, TransportError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::hub::HubHandle;

/// Where a session is in its life.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Asking the hub to add this connection.
    Registering,
    /// Forwarding each received message to the hub.
    Receiving,
    /// Deregistering and closing. Terminal.
    Terminating,
}

/// Why a session ended.
#[derive(Debug)]
pub enum SessionEnd {
    /// The peer disconnected or sent something unreadable.
    ReceiveFailed(TransportError),
    /// The server is shutting down.
    Shutdown,
}

/// Run a session for one connection until its first receive failure.
///
/// 1. Registers `sink` with the hub
/// 2. Broadcasts every message read from `source`
/// 3. On a read error, broadcasts the error text so the other peers learn of
///    the disconnect, then removes itself from the hub
/// 4. Closes the sink
///
/// There is no retry. Cancelling `shutdown` skips step 3's broadcast.
#[instrument(skip_all, fields(conn_id = %sink.id()))]
pub async fn run_session<S: MessageSource>(
    mut source: S,
    sink: Arc<dyn MessageSink>,
    hub: HubHandle,
    shutdown: CancellationToken,
) -> SessionEnd {
    let id = sink.id().to_owned();

    enter(SessionState::Registering);
    hub.add(Arc::clone(&sink));

    enter(SessionState::Receiving);
    let end = loop {
        tokio::select! {
            biased;
            () = shutdown.cancelled() => break SessionEnd::Shutdown,
            received = source.receive() => match received {
                Ok(message) => hub.broadcast(message),
                Err(e) => break SessionEnd::ReceiveFailed(e),
            },
        }
    };

    enter(SessionState::Terminating);
    match &end {
        SessionEnd::ReceiveFailed(e) => {
            if e.is_closed() {
                info!("peer disconnected, ending session");
            } else {
                warn!(error = %e, "receive failed, ending session");
            }
            hub.broadcast(Message::from(e.to_string()));
        }
        SessionEnd::Shutdown => info!("server shutting down, ending session"),
    }
    hub.remove(id);
    sink.close().await;
    end
}

fn enter(state: SessionState) {
    debug!(?state, "session state");
}
