//! Error types for the session layer.

use wordfray_protocol::ProtocolError;
use wordfray_transport::TransportError;

/// Errors that can occur during session management.
///
/// Drops after the session is up are not errors: they are reported as
/// [`SessionEvent::ConnectionLost`](crate::SessionEvent::ConnectionLost) and
/// recovered by reconnection.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The initial connection to a bootstrap endpoint failed.
    /// Unlike a later drop, this is not retried.
    #[error("initial connection failed: {0}")]
    ConnectFailed(#[source] TransportError),

    /// An outbound message could not be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
