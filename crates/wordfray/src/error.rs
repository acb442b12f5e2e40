//! Unified error type for the Wordfray client.

use std::path::PathBuf;

use wordfray_protocol::ProtocolError;
use wordfray_session::SessionError;
use wordfray_transport::TransportError;
use wordfray_turn::TurnError;

/// Errors reading or writing the persisted client configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum WordfrayError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Session(#[from] SessionError),

    /// A local action or inbound message the game state refused.
    #[error(transparent)]
    Turn(#[from] TurnError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
