//! Error types for the turn layer.

use crate::Phase;

/// Why a local action or inbound message was not applied.
///
/// None of these are fatal. Each leaves the machine in a consistent phase
/// that still accepts the right input.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    /// A local action outside the phase that accepts it, or before the
    /// game started.
    #[error("cannot {action} during {phase}")]
    NotAccepting { action: &'static str, phase: Phase },

    /// The typed word is shorter than a full row.
    #[error("word has {len} letters, {expected} needed")]
    Incomplete { len: usize, expected: usize },

    /// The local dictionary doesn't know the word.
    #[error("{0} is not in the word list")]
    UnknownWord(String),

    /// A sabotage pick outside the opponent's current row.
    #[error("slot ({column}, {row}) cannot be sabotaged this turn")]
    WrongSlot { column: usize, row: usize },

    /// An inbound message already applied or out of place, e.g. a
    /// replayed duplicate. Ignored.
    #[error("unexpected {kind} during {phase}")]
    Unexpected { kind: &'static str, phase: Phase },

    /// `other-player-word` carried a `who_wins` value outside the protocol.
    #[error("invalid round outcome {0:?}")]
    InvalidOutcome(String),
}
