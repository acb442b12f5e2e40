//! Core protocol types for Wordfray's wire format.
//!
//! Every frame on the wire is a JSON object with two fields:
//!
//! ```text
//! { "type": "word-hints", "content": ["green", "gray", "yellow", "gray", "green"] }
//! ```
//!
//! Outbound messages are modelled by [`ClientMessage`], which serde can
//! write directly in that shape. Inbound frames are first read as a loose
//! [`Envelope`] and then narrowed into a [`ServerMessage`]; doing it in two
//! steps lets the client tell a malformed frame apart from a well-formed
//! frame of a type it doesn't know.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Number of letters in every guess.
pub const WORD_LENGTH: usize = 5;

/// Number of rows (turns) on each grid.
pub const MAX_WORD_COUNT: usize = 6;

/// Turn-timer values, in seconds, the server accepts. `0` disables the timer.
pub const TIMER_CHOICES: [u32; 5] = [0, 5, 10, 15, 30];

// ---------------------------------------------------------------------------
// Hints
// ---------------------------------------------------------------------------

/// Per-letter feedback for a submitted word.
///
/// `#[serde(rename_all = "lowercase")]` matches the wire names
/// `"green"`, `"yellow"`, `"red"`, `"gray"`, `"none"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HintColor {
    /// Right letter, right position.
    Green,
    /// Letter is in the word, elsewhere.
    Yellow,
    /// Slot was sabotaged by the opponent. Not real hint information.
    Red,
    /// Letter is absent.
    Gray,
    /// No information.
    None,
}

impl fmt::Display for HintColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
            Self::Gray => "gray",
            Self::None => "none",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Round outcome
// ---------------------------------------------------------------------------

/// Result of a round, as carried by `other-player-word`'s `who_wins` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Nobody guessed the word; play continues.
    Nobody,
    /// The local player won.
    You,
    /// The opponent won.
    Other,
    /// Both guessed it in the same round.
    Both,
}

impl FromStr for RoundOutcome {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::Nobody),
            "you" => Ok(Self::You),
            "other" => Ok(Self::Other),
            "both" => Ok(Self::Both),
            other => Err(ProtocolError::InvalidMessage(format!(
                "unknown who_wins value {other:?}"
            ))),
        }
    }
}

impl fmt::Display for RoundOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Nobody => "none",
            Self::You => "you",
            Self::Other => "other",
            Self::Both => "both",
        };
        f.write_str(tag)
    }
}

// ---------------------------------------------------------------------------
// Game options
// ---------------------------------------------------------------------------

/// Options the player picks before a game, echoed to the server via
/// `game-options`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOptions {
    /// Turn timer in seconds. Must be one of [`TIMER_CHOICES`].
    pub timer: u32,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self { timer: 0 }
    }
}

impl GameOptions {
    /// Replaces any value the server wouldn't accept with its default.
    pub fn validated(mut self) -> Self {
        if !TIMER_CHOICES.contains(&self.timer) {
            tracing::warn!(
                timer = self.timer,
                "invalid value found for option \"timer\", resetting to default"
            );
            self.timer = Self::default().timer;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// Messages the client sends.
///
/// `#[serde(tag = "type", content = "content")]` produces the adjacently
/// tagged envelope directly:
///   `{ "type": "word", "content": { "word": "CRANE" } }`
/// Empty struct variants like `Ping {}` serialize their content as `{}`,
/// which is what the server expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// A submitted guess.
    Word { word: String },

    /// Disable slot `id` of the opponent's current row.
    Sabotage { id: usize },

    /// Keep-alive, sent on a fixed interval while connected.
    Ping {},

    /// The player wants a rematch.
    RestartReady {},

    /// The player's game options.
    GameOptions { options: GameOptions },
}

impl ClientMessage {
    /// The wire `type` string of this message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Word { .. } => "word",
            Self::Sabotage { .. } => "sabotage",
            Self::Ping {} => "ping",
            Self::RestartReady {} => "restart-ready",
            Self::GameOptions { .. } => "game-options",
        }
    }

    /// Returns `true` for keep-alive pings, which are never replayed.
    pub fn is_ping(&self) -> bool {
        matches!(self, Self::Ping {})
    }
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// The loose wire unit: a type tag and arbitrary JSON content.
///
/// `content` defaults to `null` so bare `{ "type": "restart" }` frames
/// decode too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// The message type, e.g. `"word-hints"`.
    #[serde(rename = "type")]
    pub kind: String,

    /// Type-specific payload.
    #[serde(default)]
    pub content: serde_json::Value,
}

/// Content of `other-player-word`.
///
/// `who_wins` is kept as the raw string so an unexpected value can be
/// surfaced as a diagnostic after the opponent's word is recorded, instead
/// of failing the whole frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpponentWord {
    pub word: String,
    pub who_wins: String,
}

impl OpponentWord {
    /// Parses the round-outcome tag.
    pub fn outcome(&self) -> Result<RoundOutcome, ProtocolError> {
        self.who_wins.parse()
    }
}

/// Messages the server sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// The code of the room the host just created.
    RoomCode(String),
    /// The second player joined the host's room.
    OtherPlayerConnected,
    /// Both words are in: the opponent's guess and the round outcome.
    OtherPlayerWord(OpponentWord),
    /// One color per letter of the local player's last word.
    WordHints(Vec<HintColor>),
    /// The server refused the word just submitted.
    WordRejected,
    /// The answer, revealed after a loss.
    Solution(String),
    /// Both players confirmed: a new game begins.
    Restart,
}

impl ServerMessage {
    /// The wire `type` string of this message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RoomCode(_) => "room-code",
            Self::OtherPlayerConnected => "other-player-connected",
            Self::OtherPlayerWord(_) => "other-player-word",
            Self::WordHints(_) => "word-hints",
            Self::WordRejected => "word-rejected",
            Self::Solution(_) => "solution",
            Self::Restart => "restart",
        }
    }
}

impl TryFrom<Envelope> for ServerMessage {
    type Error = ProtocolError;

    fn try_from(envelope: Envelope) -> Result<Self, Self::Error> {
        let Envelope { kind, content } = envelope;
        let msg = match kind.as_str() {
            "room-code" => Self::RoomCode(content_as(content)?),
            "other-player-connected" => Self::OtherPlayerConnected,
            "other-player-word" => Self::OtherPlayerWord(content_as(content)?),
            "word-hints" => {
                let hints: Vec<HintColor> = content_as(content)?;
                if hints.len() != WORD_LENGTH {
                    return Err(ProtocolError::InvalidMessage(format!(
                        "expected {WORD_LENGTH} hints, got {}",
                        hints.len()
                    )));
                }
                Self::WordHints(hints)
            }
            "word-rejected" => Self::WordRejected,
            "solution" => Self::Solution(content_as(content)?),
            "restart" => Self::Restart,
            _ => return Err(ProtocolError::UnknownType(kind)),
        };
        Ok(msg)
    }
}

fn content_as<T: serde::de::DeserializeOwned>(content: serde_json::Value) -> Result<T, ProtocolError> {
    serde_json::from_value(content).map_err(ProtocolError::Decode)
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The server is written against exact JSON shapes. These tests pin
    //! the shapes our serde attributes produce and accept.

    use serde_json::json;

    use super::*;

    fn envelope(value: serde_json::Value) -> Envelope {
        serde_json::from_value(value).unwrap()
    }

    // =====================================================================
    // ClientMessage
    // =====================================================================

    #[test]
    fn test_word_json_format() {
        let msg = ClientMessage::Word { word: "CRANE".into() };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json, json!({ "type": "word", "content": { "word": "CRANE" } }));
    }

    #[test]
    fn test_sabotage_json_format() {
        let msg = ClientMessage::Sabotage { id: 3 };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json, json!({ "type": "sabotage", "content": { "id": 3 } }));
    }

    #[test]
    fn test_empty_messages_carry_empty_object() {
        let ping = serde_json::to_value(ClientMessage::Ping {}).unwrap();
        assert_eq!(ping, json!({ "type": "ping", "content": {} }));

        let ready = serde_json::to_value(ClientMessage::RestartReady {}).unwrap();
        assert_eq!(ready, json!({ "type": "restart-ready", "content": {} }));
    }

    #[test]
    fn test_game_options_json_format() {
        let msg = ClientMessage::GameOptions { options: GameOptions { timer: 15 } };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            json!({ "type": "game-options", "content": { "options": { "timer": 15 } } })
        );
    }

    #[test]
    fn test_kind_matches_serialized_type() {
        let msgs = [
            ClientMessage::Word { word: "CRANE".into() },
            ClientMessage::Sabotage { id: 0 },
            ClientMessage::Ping {},
            ClientMessage::RestartReady {},
            ClientMessage::GameOptions { options: GameOptions::default() },
        ];
        for msg in msgs {
            let json = serde_json::to_value(&msg).unwrap();
            assert_eq!(json["type"], msg.kind());
        }
    }

    #[test]
    fn test_only_ping_is_ping() {
        assert!(ClientMessage::Ping {}.is_ping());
        assert!(!ClientMessage::RestartReady {}.is_ping());
    }

    // =====================================================================
    // ServerMessage
    // =====================================================================

    #[test]
    fn test_room_code_from_envelope() {
        let env = envelope(json!({ "type": "room-code", "content": "zatouki" }));
        assert_eq!(
            ServerMessage::try_from(env).unwrap(),
            ServerMessage::RoomCode("zatouki".into())
        );
    }

    #[test]
    fn test_unit_messages_accept_null_or_missing_content() {
        let with_null = envelope(json!({ "type": "other-player-connected", "content": null }));
        assert_eq!(
            ServerMessage::try_from(with_null).unwrap(),
            ServerMessage::OtherPlayerConnected
        );

        let bare = envelope(json!({ "type": "restart" }));
        assert_eq!(ServerMessage::try_from(bare).unwrap(), ServerMessage::Restart);

        let with_object = envelope(json!({ "type": "word-rejected", "content": {} }));
        assert_eq!(ServerMessage::try_from(with_object).unwrap(), ServerMessage::WordRejected);
    }

    #[test]
    fn test_other_player_word_from_envelope() {
        let env = envelope(json!({
            "type": "other-player-word",
            "content": { "word": "TRACE", "who_wins": "none" }
        }));
        let ServerMessage::OtherPlayerWord(word) = ServerMessage::try_from(env).unwrap() else {
            panic!("expected other-player-word");
        };
        assert_eq!(word.word, "TRACE");
        assert_eq!(word.outcome().unwrap(), RoundOutcome::Nobody);
    }

    #[test]
    fn test_word_hints_from_envelope() {
        let env = envelope(json!({
            "type": "word-hints",
            "content": ["green", "gray", "yellow", "red", "none"]
        }));
        assert_eq!(
            ServerMessage::try_from(env).unwrap(),
            ServerMessage::WordHints(vec![
                HintColor::Green,
                HintColor::Gray,
                HintColor::Yellow,
                HintColor::Red,
                HintColor::None,
            ])
        );
    }

    #[test]
    fn test_word_hints_wrong_length_is_invalid() {
        let env = envelope(json!({ "type": "word-hints", "content": ["green", "gray"] }));
        assert!(matches!(
            ServerMessage::try_from(env),
            Err(ProtocolError::InvalidMessage(_))
        ));
    }

    #[test]
    fn test_word_hints_unknown_color_is_decode_error() {
        let env = envelope(json!({
            "type": "word-hints",
            "content": ["green", "gray", "purple", "gray", "gray"]
        }));
        assert!(matches!(ServerMessage::try_from(env), Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_unknown_type_is_reported_by_name() {
        let env = envelope(json!({ "type": "fly-to-moon", "content": 9000 }));
        match ServerMessage::try_from(env) {
            Err(ProtocolError::UnknownType(kind)) => assert_eq!(kind, "fly-to-moon"),
            other => panic!("expected UnknownType, got {other:?}"),
        }
    }

    #[test]
    fn test_solution_with_wrong_content_shape_is_decode_error() {
        let env = envelope(json!({ "type": "solution", "content": { "word": "CRANE" } }));
        assert!(matches!(ServerMessage::try_from(env), Err(ProtocolError::Decode(_))));
    }

    // =====================================================================
    // RoundOutcome, GameOptions, HintColor
    // =====================================================================

    #[test]
    fn test_round_outcome_parses_every_tag() {
        assert_eq!("none".parse::<RoundOutcome>().unwrap(), RoundOutcome::Nobody);
        assert_eq!("you".parse::<RoundOutcome>().unwrap(), RoundOutcome::You);
        assert_eq!("other".parse::<RoundOutcome>().unwrap(), RoundOutcome::Other);
        assert_eq!("both".parse::<RoundOutcome>().unwrap(), RoundOutcome::Both);
        assert!("everyone".parse::<RoundOutcome>().is_err());
    }

    #[test]
    fn test_game_options_validated_resets_unknown_timer() {
        assert_eq!(GameOptions { timer: 10 }.validated().timer, 10);
        assert_eq!(GameOptions { timer: 7 }.validated().timer, 0);
    }

    #[test]
    fn test_hint_color_display_matches_wire_name() {
        for color in [
            HintColor::Green,
            HintColor::Yellow,
            HintColor::Red,
            HintColor::Gray,
            HintColor::None,
        ] {
            let json = serde_json::to_value(color).unwrap();
            assert_eq!(json, color.to_string());
        }
    }
}
