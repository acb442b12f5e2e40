//! Turn phases.

/// Who may act during a turn.
///
/// Each round cycles through the phases in this order:
///
/// ```text
/// Typing → TypeWait → Sabotage → SabotageWait → Typing (next row)
///             │
///             └─(round decided)→ Restart → RestartWait → Typing (row 0)
/// ```
///
/// - **Typing**: the player fills the current row.
/// - **TypeWait**: the word is sent; waiting for the opponent's word.
/// - **Sabotage**: the player picks one slot of the opponent's row to hide.
/// - **SabotageWait**: waiting for the hints of the player's own word.
/// - **Restart**: the game is over; the player may ask for a rematch.
/// - **RestartWait**: waiting for the opponent to agree.
///
/// The `*Wait` phases are left only when a server message arrives. The
/// server may also close a round while the player is still in `Typing` or
/// `Sabotage` (turn timer); the machine then skips to the matching wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Typing,
    TypeWait,
    Sabotage,
    SabotageWait,
    Restart,
    RestartWait,
}

impl Phase {
    /// Returns `true` if the local player may act in this phase.
    pub fn accepts_input(self) -> bool {
        matches!(self, Self::Typing | Self::Sabotage | Self::Restart)
    }

    /// Returns `true` once the game has a result.
    pub fn is_game_over(self) -> bool {
        matches!(self, Self::Restart | Self::RestartWait)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Typing => write!(f, "Typing"),
            Self::TypeWait => write!(f, "TypeWait"),
            Self::Sabotage => write!(f, "Sabotage"),
            Self::SabotageWait => write!(f, "SabotageWait"),
            Self::Restart => write!(f, "Restart"),
            Self::RestartWait => write!(f, "RestartWait"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_three_phases_accept_input() {
        let accepting: Vec<_> = [
            Phase::Typing,
            Phase::TypeWait,
            Phase::Sabotage,
            Phase::SabotageWait,
            Phase::Restart,
            Phase::RestartWait,
        ]
        .into_iter()
        .filter(|p| p.accepts_input())
        .collect();

        assert_eq!(accepting, vec![Phase::Typing, Phase::Sabotage, Phase::Restart]);
    }

    #[test]
    fn test_game_over_phases() {
        assert!(Phase::Restart.is_game_over());
        assert!(Phase::RestartWait.is_game_over());
        assert!(!Phase::SabotageWait.is_game_over());
    }

    #[test]
    fn test_phase_default_and_display() {
        assert_eq!(Phase::default(), Phase::Typing);
        assert_eq!(Phase::SabotageWait.to_string(), "SabotageWait");
    }
}
