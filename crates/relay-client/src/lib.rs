//! # relay-client
//!
//! Terminal client for the relay.
//!
//! - [`connect`] dials `ws://<host>:<port>/`
//! - [`forward_lines`] sends each non-empty input line as a message
//! - [`print_messages`] writes the text of every relayed message, one per line
//! - [`relay`] runs both until the input runs out or the connection ends

#![deny(unsafe_code)]

pub mod config;

use std::fmt::Display;

use futures::{Sink, SinkExt, Stream, StreamExt};
use relay_core::{Message, TransportError};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_tungstenite::tungstenite::{self, Message as WsMessage};
use tracing::{debug, info};

pub use config::ClientConfig;

/// A connected client socket.
pub type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Client failures.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Could not establish the connection.
    #[error("failed to connect to {url}: {source}")]
    Connect {
        /// Address that was dialed.
        url: String,
        /// Underlying handshake or socket error.
        #[source]
        source: tungstenite::Error,
    },

    /// Sending or receiving on an established connection failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Reading input or writing output failed.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Why [`relay`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientExit {
    /// Input reached end of file.
    InputExhausted,
    /// The server closed the connection.
    ConnectionClosed,
}

/// Dial the relay server.
pub async fn connect(config: &ClientConfig) -> Result<WsStream, ClientError> {
    let url = config.url();
    let (ws, _response) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .map_err(|source| ClientError::Connect {
            url: url.clone(),
            source,
        })?;
    info!(%url, "connected");
    Ok(ws)
}

/// Send each non-empty line of `input` as one message.
///
/// Returns the number of messages sent once input is exhausted.
pub async fn forward_lines<R, S>(input: R, sink: &mut S) -> Result<usize, ClientError>
where
    R: AsyncBufRead + Unpin,
    S: Sink<WsMessage> + Unpin,
    S::Error: Display,
{
    let mut lines = input.lines();
    let mut sent = 0usize;
    while let Some(line) = lines.next_line().await? {
        if line.is_empty() {
            continue;
        }
        let json = Message::from(line).to_json()?;
        sink.send(WsMessage::text(json))
            .await
            .map_err(TransportError::protocol)?;
        sent += 1;
    }
    debug!(sent, "input exhausted");
    Ok(sent)
}

/// Write the text of every relayed message to `output`, one per line.
///
/// Returns the number printed once the server closes the connection. A
/// protocol error or malformed payload ends printing with an error.
pub async fn print_messages<St, W>(mut stream: St, output: &mut W) -> Result<usize, ClientError>
where
    St: Stream<Item = Result<WsMessage, tungstenite::Error>> + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut printed = 0usize;
    while let Some(frame) = stream.next().await {
        let message = match frame.map_err(TransportError::protocol)? {
            WsMessage::Text(text) => Message::from_json(text.as_str())?,
            WsMessage::Binary(bytes) => Message::from_json_slice(&bytes)?,
            WsMessage::Close(_) => break,
            WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_) => continue,
        };
        output.write_all(message.text.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
        printed += 1;
    }
    debug!(printed, "connection closed");
    Ok(printed)
}

/// Run the client over an established connection until input is exhausted
/// or the connection ends.
pub async fn relay<R, W>(ws: WsStream, input: R, mut output: W) -> Result<ClientExit, ClientError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (mut write, read) = ws.split();

    let exit = tokio::select! {
        sent = forward_lines(input, &mut write) => {
            let _ = sent?;
            ClientExit::InputExhausted
        }
        printed = print_messages(read, &mut output) => {
            let _ = printed?;
            ClientExit::ConnectionClosed
        }
    };

    if exit == ClientExit::InputExhausted {
        let _ = write.close().await;
    }
    info!(?exit, "client finished");
    Ok(exit)
}
