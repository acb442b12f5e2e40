//! The presentation seam.
//!
//! The turn machine describes what the player should see; a [`Presenter`]
//! decides how. A terminal front end logs the calls, a test records them.

use wordfray_protocol::HintColor;

/// The two letter grids side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridSide {
    /// The local player's guesses.
    Player,
    /// The opponent's guesses.
    Enemy,
}

/// Which grid is highlighted as accepting input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveGrid {
    Player,
    Enemy,
    Both,
    None,
}

/// Top-level views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    /// Create or join a room.
    Start,
    /// Room created, waiting for the second player.
    Wait,
    /// The game itself.
    Game,
}

/// Transient notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toast {
    RoomCreationFailed,
    RoomJoinFailed,
    ConnectionLost,
    Reconnected,
    WordRejected,
    UnknownWord,
    ProtocolError,
}

/// The one-line instruction shown above the grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Banner {
    EnterWord,
    Wait,
    Sabotage,
    WaitRestart,
    Won,
    Lost,
    Draw,
}

/// Calls the turn machine makes into the presentation layer.
///
/// Columns and rows are zero-based. Implementations must not fail: a
/// presenter that can't draw something should log and carry on.
pub trait Presenter {
    fn render_letter(&mut self, side: GridSide, column: usize, row: usize, letter: char);

    fn clear_letter(&mut self, side: GridSide, column: usize, row: usize);

    fn reveal_hint(&mut self, side: GridSide, column: usize, row: usize, color: HintColor);

    fn set_active_grid(&mut self, grid: ActiveGrid);

    /// Marks `row` of `side` as (not) clickable for sabotage.
    fn set_sabotage_target(&mut self, side: GridSide, row: usize, enabled: bool);

    fn play_invalid_animation(&mut self, side: GridSide, row: usize);

    fn play_win_animation(&mut self, side: GridSide, row: usize);

    /// Colors a key of the on-screen keyboard.
    fn set_keyboard_hint(&mut self, letter: char, color: HintColor);

    fn clear_keyboard_hints(&mut self);

    fn show_panel(&mut self, panel: Panel);

    fn show_toast(&mut self, toast: Toast);

    fn set_game_hint_banner(&mut self, banner: Banner);

    /// Shows the code of a freshly created room so it can be shared.
    fn show_room_code(&mut self, code: &str);

    /// Reveals the answer at the end of a game.
    fn show_solution(&mut self, word: &str);

    /// Empties both grids for a new game.
    fn reset_grids(&mut self);
}
