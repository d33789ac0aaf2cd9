//! # relay-core
//!
//! Shared vocabulary for the relay server and client.
//!
//! - **Message**: the `{"text": ...}` payload carried over the wire
//! - **Errors**: [`TransportError`] via `thiserror`
//! - **Connection traits**: [`MessageSink`] and [`MessageSource`], the seam
//!   between the hub and a concrete transport
//! - **Logging**: `tracing` subscriber setup shared by both binaries

#![deny(unsafe_code)]

pub mod connection;
pub mod errors;
pub mod logging;
pub mod message;

pub use connection::{MessageSink, MessageSource};
pub use errors::TransportError;
pub use message::Message;
