//! Connection registry and broadcast coordinator.
//!
//! One [`Hub`] task per server owns the registry outright. Sessions reach it
//! only through a [`HubHandle`], which pushes [`HubCommand`]s onto a single
//! unbounded queue. The hub drains that queue one command at a time, so no
//! two registry mutations or broadcasts ever interleave and every broadcast
//! sees one consistent set of connections.

use std::collections::HashMap;
use std::sync::Arc;

use relay_core::{Message, MessageSink};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A request to the hub.
pub enum HubCommand {
    /// Register a connection under its identity, replacing any existing entry.
    Add(Arc<dyn MessageSink>),
    /// Deregister the connection with this identity, if present.
    Remove(String),
    /// Send a message to every registered connection.
    Broadcast(Message),
    /// Report the identities currently registered.
    Snapshot(oneshot::Sender<Vec<String>>),
}

/// Cloneable request side of the hub.
///
/// `add`, `remove` and `broadcast` enqueue and return immediately; the caller
/// never learns how or when the request was carried out.
#[derive(Clone)]
pub struct HubHandle {
    tx: mpsc::UnboundedSender<HubCommand>,
}

impl HubHandle {
    /// Register a connection.
    pub fn add(&self, connection: Arc<dyn MessageSink>) {
        self.submit(HubCommand::Add(connection));
    }

    /// Deregister a connection by identity.
    pub fn remove(&self, connection_id: impl Into<String>) {
        self.submit(HubCommand::Remove(connection_id.into()));
    }

    /// Broadcast a message to all registered connections.
    pub fn broadcast(&self, message: Message) {
        self.submit(HubCommand::Broadcast(message));
    }

    /// Identities registered once every previously queued request is applied.
    ///
    /// Returns an empty list if the hub has stopped.
    pub async fn connections(&self) -> Vec<String> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.submit(HubCommand::Snapshot(reply_tx));
        reply_rx.await.unwrap_or_default()
    }

    /// Number of registered connections.
    pub async fn connection_count(&self) -> usize {
        self.connections().await.len()
    }

    /// Whether the hub task is still accepting requests.
    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }

    fn submit(&self, command: HubCommand) {
        if self.tx.send(command).is_err() {
            warn!("hub is not running, dropping request");
        }
    }
}

/// The coordinator task and the registry it owns.
pub struct Hub {
    rx: mpsc::UnboundedReceiver<HubCommand>,
    /// Registered connections indexed by remote identity.
    connections: HashMap<String, Arc<dyn MessageSink>>,
}

impl Hub {
    /// Create a hub and its request handle. The hub does nothing until [`Hub::run`].
    pub fn new() -> (Self, HubHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let hub = Self {
            rx,
            connections: HashMap::new(),
        };
        (hub, HubHandle { tx })
    }

    /// Create a hub and run it on its own task.
    pub fn spawn() -> (HubHandle, JoinHandle<()>) {
        let (hub, handle) = Self::new();
        let task = tokio::spawn(hub.run());
        (handle, task)
    }

    /// Process requests until every [`HubHandle`] has been dropped.
    pub async fn run(mut self) {
        info!("hub started");
        while let Some(command) = self.rx.recv().await {
            self.handle(command).await;
        }
        info!(remaining = self.connections.len(), "hub stopped");
    }

    async fn handle(&mut self, command: HubCommand) {
        match command {
            HubCommand::Add(connection) => self.add(connection),
            HubCommand::Remove(id) => self.remove(&id),
            HubCommand::Broadcast(message) => self.broadcast(&message).await,
            HubCommand::Snapshot(reply) => {
                let _ = reply.send(self.connections.keys().cloned().collect());
            }
        }
    }

    fn add(&mut self, connection: Arc<dyn MessageSink>) {
        let id = connection.id().to_owned();
        if self.connections.insert(id.clone(), connection).is_some() {
            warn!(conn_id = %id, "replaced connection with duplicate identity");
        }
        info!(conn_id = %id, total = self.connections.len(), "connection registered");
    }

    fn remove(&mut self, id: &str) {
        if self.connections.remove(id).is_some() {
            info!(conn_id = %id, total = self.connections.len(), "connection removed");
        } else {
            debug!(conn_id = %id, "remove for unknown connection");
        }
    }

    /// Send to each connection in turn. A failed send is logged and skipped;
    /// the connection stays registered until its own session removes it.
    async fn broadcast(&self, message: &Message) {
        let recipients = self.connections.len();
        let mut failed = 0usize;
        for (id, connection) in &self.connections {
            if let Err(e) = connection.send(message).await {
                failed += 1;
                warn!(conn_id = %id, error = %e, "failed to broadcast message");
            }
        }
        debug!(recipients, failed, "broadcast complete");
    }
}
