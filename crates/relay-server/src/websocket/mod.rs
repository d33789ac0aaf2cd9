//! `WebSocket` transport adapter for the hub and session loops.

pub mod connection;

pub use connection::{WsSink, WsSource, split_socket};
