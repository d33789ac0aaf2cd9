//! Connection traits: the seam between the hub and a concrete transport.
//!
//! A physical connection is split into two halves. The write half
//! ([`MessageSink`]) is shared: the hub holds it to fan out broadcasts and
//! the owning session holds it to close the transport. The read half
//! ([`MessageSource`]) is owned by exactly one session loop.

use async_trait::async_trait;

use crate::errors::TransportError;
use crate::message::Message;

/// Write half of a connection.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Stable identity of the peer (its remote address).
    ///
    /// Must not change for the life of the connection.
    fn id(&self) -> &str;

    /// Send one message. Resolves once the frame is written or fails.
    async fn send(&self, message: &Message) -> Result<(), TransportError>;

    /// Close the transport. Errors are swallowed; the peer may already be gone.
    async fn close(&self);
}

/// Read half of a connection.
#[async_trait]
pub trait MessageSource: Send {
    /// Wait for the next message from the peer.
    ///
    /// Any error is terminal for the connection.
    async fn receive(&mut self) -> Result<Message, TransportError>;
}
