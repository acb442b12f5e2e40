//! Error types for the protocol layer.
//!
//! Each crate in Wordfray defines its own error enum. When you see a
//! `ProtocolError`, you know the problem is in the shape of a message, not
//! in networking or in the turn logic.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into a frame).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning a frame into a Rust type).
    ///
    /// Common causes: malformed JSON, a missing `type` field, or content
    /// with the wrong shape for its type.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The envelope decoded but its `type` is not one the client knows.
    ///
    /// Reported and dropped by the session layer, never fatal.
    #[error("unknown message type {0:?}")]
    UnknownType(String),

    /// The message is invalid at the protocol level.
    ///
    /// For logical errors that pass deserialization but violate protocol
    /// rules, e.g. a hint list that is not one color per letter.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
