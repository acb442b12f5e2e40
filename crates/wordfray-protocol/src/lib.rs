//! Wire protocol for Wordfray.
//!
//! This crate defines the "language" the client and the game server speak:
//!
//! - **Types** ([`Envelope`], [`ClientMessage`], [`ServerMessage`],
//!   [`HintColor`], etc.): the message structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages are
//!   converted to and from text frames.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw text frames) and the
//! session layer (connection lifecycle). It doesn't know about connections
//! or turns. It only knows how to serialize and deserialize messages.
//!
//! ```text
//! Transport (frames) → Protocol (Envelope → ServerMessage) → Session
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    ClientMessage, Envelope, GameOptions, HintColor, MAX_WORD_COUNT, OpponentWord, RoundOutcome,
    ServerMessage, TIMER_CHOICES, WORD_LENGTH,
};
