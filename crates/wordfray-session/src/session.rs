//! Session types: the data that describes one game attempt's connection.
//!
//! A "session" is the client's record of which room it belongs to and in
//! what role. It tracks:
//! - WHICH room (`room_code`)
//! - in WHAT role (`is_host`), which picks the reconnect endpoint
//! - the connection lifecycle state ([`ConnectionState`])

use std::fmt;
use std::time::Duration;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Timing for keepalive and reconnection.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Period between `ping` messages while connected.
    ///
    /// Default: 1 second. Zero disables the keepalive.
    pub keepalive_interval: Duration,

    /// Fixed wait before each reconnection attempt.
    ///
    /// Default: 1 second.
    pub reconnect_delay: Duration,

    /// Upper bound of random extra wait added to each reconnection attempt,
    /// so both players of a dropped room don't dial at the same instant.
    ///
    /// Default: zero (the delay is exactly `reconnect_delay`).
    pub reconnect_jitter: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            keepalive_interval: Duration::from_millis(1000),
            reconnect_delay: Duration::from_millis(1000),
            reconnect_jitter: Duration::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// ConnectionState
// ---------------------------------------------------------------------------

/// Lifecycle of the single transport the client owns.
///
/// ```text
///   Disconnected ──connect()──→ Connecting ──ok──→ Connected
///        ↑                          │                 │ (drop / failed send)
///        └──────────err─────────────┘                 ▼
///                              Connected ←──ok── ReconnectPending ⟲ (err)
/// ```
///
/// A failed *initial* connect goes back to `Disconnected` and stays there;
/// only a drop after success enters `ReconnectPending`, which retries until
/// it succeeds or the session is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    ReconnectPending,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Connected => write!(f, "Connected"),
            Self::ReconnectPending => write!(f, "ReconnectPending"),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Identity of the current game attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Assigned by the server (`room-code`) when hosting, supplied by the
    /// player when joining. `None` until known.
    pub room_code: Option<String>,

    /// `true` if this client created the room.
    pub is_host: bool,
}

// ---------------------------------------------------------------------------
// Endpoint
// ---------------------------------------------------------------------------

/// The server endpoints a session can dial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Create a fresh room; the server answers with `room-code`.
    CreateRoom,
    /// Join an existing room by code.
    JoinRoom(String),
    /// Resume a dropped session.
    Reconnect { is_host: bool, room_code: String },
}

impl Endpoint {
    /// Builds the URL for this endpoint on the server at `address`.
    ///
    /// `address` may be a bare `host:port` (then `ws://` is assumed) or a
    /// full `ws://` URL.
    pub fn url(&self, address: &str) -> String {
        let address = address.trim().trim_end_matches('/');
        let base = if address.contains("://") {
            address.to_string()
        } else {
            format!("ws://{address}")
        };

        match self {
            Self::CreateRoom => format!("{base}/create-room"),
            Self::JoinRoom(code) => format!("{base}/join-room/{code}"),
            Self::Reconnect { is_host, room_code } => {
                let role = if *is_host { "host" } else { "guest" };
                format!("{base}/reconnect/{room_code}/{role}")
            }
        }
    }
}
