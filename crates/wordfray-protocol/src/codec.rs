//! Frame encoding for Wordfray messages.
//!
//! A "codec" (coder/decoder) converts between Rust types and text frames.
//! The session layer doesn't care HOW messages are serialized; it just
//! needs something that implements [`Codec`]. Today that's always
//! [`JsonCodec`]; the seam keeps the session tests independent of it.

use serde::{Serialize, de::DeserializeOwned};

use crate::{ClientMessage, Envelope, ProtocolError, ServerMessage};

/// Turns messages into text frames and back.
///
/// Only `encode`/`decode` need implementing; the typed helpers build on
/// them. Codecs live inside the long-lived connection manager, hence the
/// `Send + Sync + 'static` bounds.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a text frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Deserializes a text frame back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the frame is malformed or
    /// doesn't match the expected type.
    fn decode<T: DeserializeOwned>(&self, frame: &str) -> Result<T, ProtocolError>;

    /// Encodes one outbound message as a `{type, content}` frame.
    fn encode_client(&self, msg: &ClientMessage) -> Result<String, ProtocolError> {
        self.encode(msg)
    }

    /// Decodes one inbound frame: first the loose envelope, then the typed
    /// message.
    ///
    /// # Errors
    /// - `ProtocolError::Decode`: not a JSON object with a `type` string,
    ///   or content of the wrong shape.
    /// - `ProtocolError::UnknownType`: well-formed, but an unknown `type`.
    /// - `ProtocolError::InvalidMessage`: well-formed but breaks a
    ///   protocol rule.
    fn decode_server(&self, frame: &str) -> Result<ServerMessage, ProtocolError> {
        let envelope: Envelope = self.decode(frame)?;
        ServerMessage::try_from(envelope)
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// The JSON codec the game server speaks.
///
/// ## Example
///
/// ```rust
/// use wordfray_protocol::{Codec, JsonCodec, ClientMessage, ServerMessage};
///
/// let codec = JsonCodec;
///
/// let frame = codec.encode_client(&ClientMessage::Sabotage { id: 2 }).unwrap();
/// assert_eq!(frame, r#"{"type":"sabotage","content":{"id":2}}"#);
///
/// let msg = codec.decode_server(r#"{"type":"solution","content":"CRANE"}"#).unwrap();
/// assert_eq!(msg, ServerMessage::Solution("CRANE".into()));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, frame: &str) -> Result<T, ProtocolError> {
        serde_json::from_str(frame).map_err(ProtocolError::Decode)
    }
}
