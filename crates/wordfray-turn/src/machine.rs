//! The turn phase state machine.

use std::time::Duration;

use tokio::time::Instant;
use wordfray_protocol::{
    ClientMessage, HintColor, MAX_WORD_COUNT, OpponentWord, RoundOutcome, ServerMessage,
    WORD_LENGTH,
};

use crate::{
    AcceptAll, ActiveGrid, Banner, GridSide, HintAggregator, Panel, Phase, Presenter, Toast,
    TurnError, WordChecker,
};

// ---------------------------------------------------------------------------
// TurnConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TurnConfig {
    /// How long a submitted row stays highlighted before both grids are
    /// locked for the wait. Purely visual.
    ///
    /// Default: 700 ms.
    pub reveal_delay: Duration,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self { reveal_delay: Duration::from_millis(700) }
    }
}

// ---------------------------------------------------------------------------
// TurnState
// ---------------------------------------------------------------------------

/// A scheduled visual lock. Only the holder of the current token may fire it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingReveal {
    pub token: u64,
    pub deadline: Instant,
}

/// Everything the client knows about the game in progress.
#[derive(Debug, Clone)]
pub struct TurnState {
    /// Index of the row being played; `-1` before the first turn.
    pub current_turn: i32,
    pub phase: Phase,
    /// Letters typed into the current row, uppercase.
    pub typed_word: String,
    /// One word per row the local player completed. A row the server
    /// closed before the player submitted holds an empty word.
    pub player_words: Vec<String>,
    /// One word per row the opponent completed.
    pub enemy_words: Vec<String>,
    /// Number of rows whose hints have arrived.
    pub hinted_rows: usize,
    pub hints: HintAggregator,
    pub game_started: bool,
    pub reveal: Option<PendingReveal>,
}

impl Default for TurnState {
    fn default() -> Self {
        Self {
            current_turn: -1,
            phase: Phase::Typing,
            typed_word: String::new(),
            player_words: Vec::new(),
            enemy_words: Vec::new(),
            hinted_rows: 0,
            hints: HintAggregator::new(),
            game_started: false,
            reveal: None,
        }
    }
}

impl TurnState {
    /// The current row as a grid index.
    pub fn row(&self) -> usize {
        usize::try_from(self.current_turn).unwrap_or(0)
    }

    pub fn is_last_row(&self) -> bool {
        self.row() + 1 >= MAX_WORD_COUNT
    }
}

// ---------------------------------------------------------------------------
// TurnMachine
// ---------------------------------------------------------------------------

/// Drives one client through the phases of a game.
///
/// Local actions (`type_letter`, `submit`, `sabotage`, ...) are accepted
/// only in their phase; the ones that produce traffic return the message to
/// send. Inbound messages go through [`handle_message`](Self::handle_message),
/// which ignores anything already applied for the current row (or, for
/// bootstrap and rejection messages, not expected in the current phase).
/// That makes replayed duplicates harmless.
pub struct TurnMachine<P: Presenter, W: WordChecker = AcceptAll> {
    presenter: P,
    words: W,
    config: TurnConfig,
    state: TurnState,
    next_token: u64,
}

impl<P: Presenter> TurnMachine<P> {
    pub fn new(presenter: P, config: TurnConfig) -> Self {
        Self::with_words(presenter, AcceptAll, config)
    }
}

impl<P: Presenter, W: WordChecker> TurnMachine<P, W> {
    pub fn with_words(presenter: P, words: W, config: TurnConfig) -> Self {
        Self {
            presenter,
            words,
            config,
            state: TurnState::default(),
            next_token: 0,
        }
    }

    pub fn state(&self) -> &TurnState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// Forgets the game entirely, e.g. when leaving the room.
    pub fn reset_session(&mut self) {
        self.state = TurnState::default();
    }

    // -----------------------------------------------------------------------
    // Turn flow
    // -----------------------------------------------------------------------

    /// Starts the game once both players are present. Returns `false` if it
    /// had already started.
    pub fn start_game(&mut self) -> bool {
        if self.state.game_started {
            return false;
        }
        tracing::info!("game started");
        self.presenter.reset_grids();
        self.presenter.clear_keyboard_hints();
        self.presenter.show_panel(Panel::Game);
        self.state.game_started = true;
        self.start_next_turn();
        true
    }

    fn start_next_turn(&mut self) {
        self.cancel_reveal();
        self.presenter.set_game_hint_banner(Banner::EnterWord);
        self.state.current_turn += 1;
        self.state.phase = Phase::Typing;
        self.state.typed_word.clear();
        self.presenter.set_active_grid(ActiveGrid::Player);
        tracing::debug!(turn = self.state.current_turn, "turn started");
    }

    fn start_sabotage(&mut self) {
        let row = self.state.row();
        self.state.phase = Phase::Sabotage;
        self.presenter.set_active_grid(ActiveGrid::Enemy);
        self.presenter.set_sabotage_target(GridSide::Enemy, row, true);
        self.presenter.set_game_hint_banner(Banner::Sabotage);
    }

    fn enter_restart(&mut self) {
        self.cancel_reveal();
        self.state.phase = Phase::Restart;
        self.presenter.set_active_grid(ActiveGrid::None);
    }

    fn can_act(&self, phase: Phase) -> bool {
        self.state.game_started && self.state.phase == phase
    }

    fn require(&self, phase: Phase, action: &'static str) -> Result<(), TurnError> {
        if self.can_act(phase) {
            Ok(())
        } else {
            tracing::debug!(action, phase = %self.state.phase, "action rejected");
            Err(TurnError::NotAccepting { action, phase: self.state.phase })
        }
    }

    fn clear_row(&mut self) {
        let row = self.state.row();
        for column in 0..WORD_LENGTH {
            self.presenter.clear_letter(GridSide::Player, column, row);
        }
        self.state.typed_word.clear();
    }

    // -----------------------------------------------------------------------
    // Local actions
    // -----------------------------------------------------------------------

    /// Appends a letter to the current row. Returns `false` (and does
    /// nothing) outside `Typing`, for non-letters, or when the row is full.
    pub fn type_letter(&mut self, letter: char) -> bool {
        if !self.can_act(Phase::Typing)
            || !letter.is_ascii_alphabetic()
            || self.state.typed_word.len() >= WORD_LENGTH
        {
            return false;
        }
        let letter = letter.to_ascii_uppercase();
        self.state.typed_word.push(letter);
        let column = self.state.typed_word.len() - 1;
        self.presenter.render_letter(GridSide::Player, column, self.state.row(), letter);
        true
    }

    /// Removes the last typed letter. Returns `false` if there was nothing
    /// to remove or it isn't the player's turn to type.
    pub fn backspace(&mut self) -> bool {
        if !self.can_act(Phase::Typing) || self.state.typed_word.pop().is_none() {
            return false;
        }
        let column = self.state.typed_word.len();
        self.presenter.clear_letter(GridSide::Player, column, self.state.row());
        true
    }

    /// Submits the current row.
    ///
    /// A short row is refused and kept for editing. A word the dictionary
    /// doesn't know is refused and the row is wiped. Otherwise the word is
    /// recorded, the phase becomes `TypeWait`, and the returned `word`
    /// message must be sent.
    pub fn submit(&mut self) -> Result<ClientMessage, TurnError> {
        self.require(Phase::Typing, "submit")?;
        let row = self.state.row();

        let len = self.state.typed_word.len();
        if len < WORD_LENGTH {
            self.presenter.play_invalid_animation(GridSide::Player, row);
            return Err(TurnError::Incomplete { len, expected: WORD_LENGTH });
        }

        let word = self.state.typed_word.clone();
        if !self.words.is_valid(&word) {
            tracing::debug!(%word, "word not in list");
            self.presenter.play_invalid_animation(GridSide::Player, row);
            self.presenter.show_toast(Toast::UnknownWord);
            self.clear_row();
            return Err(TurnError::UnknownWord(word));
        }

        tracing::info!(%word, row, "word submitted");
        self.state.player_words.push(word.clone());
        self.state.phase = Phase::TypeWait;
        self.schedule_reveal();
        Ok(ClientMessage::Word { word })
    }

    /// Hides one letter of the opponent's current row.
    pub fn sabotage(&mut self, column: usize, row: usize) -> Result<ClientMessage, TurnError> {
        self.require(Phase::Sabotage, "sabotage")?;
        if row != self.state.row() || column >= WORD_LENGTH {
            tracing::debug!(column, row, "sabotage outside the current row");
            return Err(TurnError::WrongSlot { column, row });
        }

        self.presenter.reveal_hint(GridSide::Enemy, column, row, HintColor::Red);
        self.presenter.set_sabotage_target(GridSide::Enemy, row, false);
        self.presenter.set_game_hint_banner(Banner::Wait);
        self.presenter.set_active_grid(ActiveGrid::None);
        self.state.phase = Phase::SabotageWait;
        Ok(ClientMessage::Sabotage { id: column })
    }

    /// Asks for a rematch after the game ended.
    pub fn confirm_restart(&mut self) -> Result<ClientMessage, TurnError> {
        self.require(Phase::Restart, "restart")?;
        self.presenter.set_game_hint_banner(Banner::WaitRestart);
        self.state.phase = Phase::RestartWait;
        Ok(ClientMessage::RestartReady {})
    }

    // -----------------------------------------------------------------------
    // Reveal delay
    // -----------------------------------------------------------------------

    fn schedule_reveal(&mut self) {
        self.next_token += 1;
        self.state.reveal = Some(PendingReveal {
            token: self.next_token,
            deadline: Instant::now() + self.config.reveal_delay,
        });
    }

    fn cancel_reveal(&mut self) {
        if let Some(reveal) = self.state.reveal.take() {
            tracing::trace!(token = reveal.token, "reveal cancelled");
        }
    }

    /// The visual lock waiting to fire, if any.
    pub fn pending_reveal(&self) -> Option<PendingReveal> {
        self.state.reveal
    }

    /// Fires the visual lock scheduled under `token`. A stale token (the
    /// lock was cancelled or replaced) does nothing and returns `false`.
    pub fn on_reveal_elapsed(&mut self, token: u64) -> bool {
        match self.state.reveal {
            Some(reveal) if reveal.token == token => {
                self.state.reveal = None;
                self.presenter.set_game_hint_banner(Banner::Wait);
                self.presenter.set_active_grid(ActiveGrid::None);
                true
            }
            _ => {
                tracing::trace!(token, "stale reveal ignored");
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Inbound messages
    // -----------------------------------------------------------------------

    /// Applies one server message.
    ///
    /// # Errors
    /// - `TurnError::Unexpected`: already applied, or not expected now
    ///   (nothing changed).
    /// - `TurnError::InvalidOutcome`: the opponent's word was recorded but
    ///   the round result was unreadable.
    pub fn handle_message(&mut self, msg: ServerMessage) -> Result<(), TurnError> {
        let kind = msg.kind();
        match msg {
            ServerMessage::RoomCode(code) => self.on_room_code(kind, &code),
            ServerMessage::OtherPlayerConnected => {
                if self.start_game() {
                    Ok(())
                } else {
                    Err(self.unexpected(kind))
                }
            }
            ServerMessage::OtherPlayerWord(word) => self.on_opponent_word(kind, word),
            ServerMessage::WordHints(colors) => self.on_word_hints(kind, &colors),
            ServerMessage::WordRejected => self.on_word_rejected(kind),
            ServerMessage::Solution(word) => self.on_solution(kind, &word),
            ServerMessage::Restart => self.on_restart(kind),
        }
    }

    fn unexpected(&self, kind: &'static str) -> TurnError {
        tracing::debug!(kind, phase = %self.state.phase, "ignoring message");
        TurnError::Unexpected { kind, phase: self.state.phase }
    }

    fn on_room_code(&mut self, kind: &'static str, code: &str) -> Result<(), TurnError> {
        if self.state.game_started {
            return Err(self.unexpected(kind));
        }
        self.presenter.show_room_code(code);
        self.presenter.show_panel(Panel::Wait);
        Ok(())
    }

    /// Ends local input for the current row without a local action, for
    /// when the server closed the round first (the turn timer ran out).
    fn close_row(&mut self) {
        let row = self.state.row();
        match self.state.phase {
            Phase::Typing => {
                tracing::debug!(row, "row closed before submit");
                self.clear_row();
                // Keep one entry per row so the hints for it still apply.
                self.state.player_words.push(String::new());
                self.state.phase = Phase::TypeWait;
            }
            Phase::Sabotage => {
                tracing::debug!(row, "sabotage window closed");
                self.presenter.set_sabotage_target(GridSide::Enemy, row, false);
                self.state.phase = Phase::SabotageWait;
            }
            _ => return,
        }
        self.presenter.set_active_grid(ActiveGrid::None);
    }

    /// Round messages count once per row. Accepted in any phase of a game
    /// in progress; the row counters turn replays into `Unexpected`.
    fn in_round(&self) -> bool {
        self.state.game_started && !self.state.phase.is_game_over()
    }

    fn on_opponent_word(&mut self, kind: &'static str, word: OpponentWord) -> Result<(), TurnError> {
        let row = self.state.row();
        if !self.in_round() || self.state.enemy_words.len() != row {
            return Err(self.unexpected(kind));
        }

        self.cancel_reveal();
        self.close_row();
        for (column, letter) in word.word.chars().take(WORD_LENGTH).enumerate() {
            self.presenter.render_letter(GridSide::Enemy, column, row, letter);
        }
        self.state.enemy_words.push(word.word.clone());

        let outcome = match word.outcome() {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, who_wins = %word.who_wins, "bad round outcome");
                self.presenter.show_toast(Toast::ProtocolError);
                return Err(TurnError::InvalidOutcome(word.who_wins));
            }
        };

        tracing::info!(%outcome, row, "round result");
        match outcome {
            RoundOutcome::Nobody if self.state.is_last_row() => {
                self.presenter.set_game_hint_banner(Banner::Wait);
                self.presenter.set_active_grid(ActiveGrid::None);
            }
            RoundOutcome::Nobody => self.start_sabotage(),
            RoundOutcome::You => {
                self.presenter.play_win_animation(GridSide::Player, row);
                self.presenter.set_game_hint_banner(Banner::Won);
                self.enter_restart();
            }
            RoundOutcome::Other => {
                self.presenter.set_game_hint_banner(Banner::Lost);
                self.enter_restart();
            }
            RoundOutcome::Both => {
                self.presenter.set_game_hint_banner(Banner::Draw);
                self.enter_restart();
            }
        }
        Ok(())
    }

    fn on_word_hints(&mut self, kind: &'static str, colors: &[HintColor]) -> Result<(), TurnError> {
        let row = self.state.row();
        if !self.in_round()
            || self.state.hinted_rows != row
            || self.state.player_words.len() <= row
        {
            return Err(self.unexpected(kind));
        }

        self.cancel_reveal();
        self.close_row();
        for (column, &color) in colors.iter().enumerate() {
            self.presenter.reveal_hint(GridSide::Player, column, row, color);
        }
        self.state.hints.merge(&self.state.player_words[row], colors);
        for (letter, color) in self.state.hints.iter() {
            self.presenter.set_keyboard_hint(letter, color);
        }
        self.state.hinted_rows += 1;

        if self.state.is_last_row() {
            tracing::debug!(row, "last row hinted, waiting for the result");
        } else {
            self.start_next_turn();
        }
        Ok(())
    }

    fn on_word_rejected(&mut self, kind: &'static str) -> Result<(), TurnError> {
        let row = self.state.row();
        if !self.can_act(Phase::TypeWait)
            || self.state.player_words.len() != row + 1
            || self.state.enemy_words.len() != row
        {
            return Err(self.unexpected(kind));
        }

        self.cancel_reveal();
        if let Some(word) = self.state.player_words.pop() {
            tracing::info!(%word, "word rejected by server");
        }
        self.clear_row();
        self.state.phase = Phase::Typing;
        self.presenter.set_active_grid(ActiveGrid::Player);
        self.presenter.set_game_hint_banner(Banner::EnterWord);
        self.presenter.play_invalid_animation(GridSide::Player, row);
        self.presenter.show_toast(Toast::WordRejected);
        Ok(())
    }

    fn on_solution(&mut self, kind: &'static str, word: &str) -> Result<(), TurnError> {
        if !self.state.game_started {
            return Err(self.unexpected(kind));
        }
        self.presenter.show_solution(word);
        if !self.state.phase.is_game_over() {
            self.enter_restart();
        }
        Ok(())
    }

    fn on_restart(&mut self, kind: &'static str) -> Result<(), TurnError> {
        let fresh = self.state.player_words.is_empty()
            && self.state.enemy_words.is_empty()
            && !self.state.phase.is_game_over();
        if !self.state.game_started || fresh {
            return Err(self.unexpected(kind));
        }
        tracing::info!(phase = %self.state.phase, "new game");
        self.state = TurnState { game_started: true, ..TurnState::default() };
        self.presenter.reset_grids();
        self.presenter.clear_keyboard_hints();
        self.start_next_turn();
        Ok(())
    }
}
