//! Axum `WebSocket` halves behind the relay connection traits.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use relay_core::{Message, MessageSink, MessageSource, TransportError};
use tokio::sync::Mutex;
use tracing::trace;

/// Write half of an upgraded socket.
///
/// The hub sends through it during broadcasts and the owning session closes
/// it on the way out, so the raw sink sits behind an async mutex.
pub struct WsSink {
    id: String,
    tx: Mutex<SplitSink<WebSocket, WsMessage>>,
}

#[async_trait]
impl MessageSink for WsSink {
    fn id(&self) -> &str {
        &self.id
    }

    async fn send(&self, message: &Message) -> Result<(), TransportError> {
        let json = message.to_json()?;
        self.tx
            .lock()
            .await
            .send(WsMessage::Text(json.into()))
            .await
            .map_err(TransportError::protocol)
    }

    async fn close(&self) {
        let mut tx = self.tx.lock().await;
        let _ = tx.send(WsMessage::Close(None)).await;
        let _ = tx.close().await;
    }
}

/// Read half of an upgraded socket.
pub struct WsSource {
    id: String,
    rx: SplitStream<WebSocket>,
}

#[async_trait]
impl MessageSource for WsSource {
    async fn receive(&mut self) -> Result<Message, TransportError> {
        loop {
            let frame = match self.rx.next().await {
                Some(Ok(frame)) => frame,
                Some(Err(e)) => return Err(TransportError::protocol(e)),
                None => return Err(TransportError::Closed),
            };
            match decode_frame(frame) {
                Some(result) => return result,
                None => trace!(conn_id = %self.id, "skipped control frame"),
            }
        }
    }
}

/// Split an upgraded socket into a source and a shareable sink, both keyed
/// by the peer's remote address.
pub fn split_socket(socket: WebSocket, remote: SocketAddr) -> (WsSource, Arc<WsSink>) {
    let id = remote.to_string();
    let (tx, rx) = socket.split();
    let sink = Arc::new(WsSink {
        id: id.clone(),
        tx: Mutex::new(tx),
    });
    (WsSource { id, rx }, sink)
}

/// Map one frame to a message. `None` for ping/pong, which axum answers itself.
fn decode_frame(frame: WsMessage) -> Option<Result<Message, TransportError>> {
    match frame {
        WsMessage::Text(text) => Some(Message::from_json(text.as_str())),
        WsMessage::Binary(bytes) => Some(Message::from_json_slice(&bytes)),
        WsMessage::Close(_) => Some(Err(TransportError::Closed)),
        WsMessage::Ping(_) | WsMessage::Pong(_) => None,
    }
}
