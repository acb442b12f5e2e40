//! Transport abstraction layer for Wordfray.
//!
//! Provides the [`Connector`] and [`Connection`] traits that abstract over
//! how the client reaches the game server. The session layer only ever
//! talks to these traits, so reconnection logic can be exercised against
//! an in-memory transport with a paused clock.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket client via `tokio-tungstenite`
//! - `memory`: in-process transport for tests ([`MemoryConnector`])

#![allow(async_fn_in_trait)]

mod error;
#[cfg(any(test, feature = "memory"))]
mod memory;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(any(test, feature = "memory"))]
pub use memory::{MemoryConnection, MemoryConnector, MemoryPeer};
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketConnector};

use std::fmt;

/// Tags one dialed connection in logs. A reconnection gets a fresh id, so
/// log lines from before and after a drop can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dial#{}", self.0)
    }
}

/// Opens outgoing connections to a server endpoint.
pub trait Connector: Send + Sync + 'static {
    /// The connection type produced by this connector.
    type Connection: Connection;

    /// Opens one connection to `url`.
    async fn connect(&self, url: &str) -> Result<Self::Connection, TransportError>;
}

/// A single connection that carries text frames in both directions.
pub trait Connection: Send + Sync + 'static {
    /// Sends one text frame to the remote peer.
    async fn send(&self, frame: &str) -> Result<(), TransportError>;

    /// Receives the next text frame from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<String>, TransportError>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), TransportError>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_orders_and_displays() {
        let first = ConnectionId::new(7);
        let second = ConnectionId::new(8);
        assert!(first < second);
        assert_eq!(second.get(), 8);
        assert_eq!(first.to_string(), "dial#7");
    }

    #[test]
    fn test_connect_failed_names_the_url() {
        let err = TransportError::ConnectFailed {
            url: "ws://nowhere/create-room".into(),
            source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
        };
        assert!(err.to_string().contains("ws://nowhere/create-room"));
    }
}
