//! Test support: a presenter that records every call.

use wordfray_protocol::HintColor;

use crate::{ActiveGrid, Banner, GridSide, Panel, Presenter, Toast};

/// One presenter call, as recorded by [`RecordingPresenter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    RenderLetter(GridSide, usize, usize, char),
    ClearLetter(GridSide, usize, usize),
    RevealHint(GridSide, usize, usize, HintColor),
    SetActiveGrid(ActiveGrid),
    SetSabotageTarget(GridSide, usize, bool),
    PlayInvalidAnimation(GridSide, usize),
    PlayWinAnimation(GridSide, usize),
    SetKeyboardHint(char, HintColor),
    ClearKeyboardHints,
    ShowPanel(Panel),
    ShowToast(Toast),
    SetGameHintBanner(Banner),
    ShowRoomCode(String),
    ShowSolution(String),
    ResetGrids,
}

#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub calls: Vec<Call>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns and forgets everything recorded so far.
    pub fn take(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }

    pub fn contains(&self, call: &Call) -> bool {
        self.calls.contains(call)
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::ShowToast(toast) => Some(*toast),
                _ => None,
            })
            .collect()
    }

    pub fn last_banner(&self) -> Option<Banner> {
        self.calls.iter().rev().find_map(|call| match call {
            Call::SetGameHintBanner(banner) => Some(*banner),
            _ => None,
        })
    }

    pub fn last_panel(&self) -> Option<Panel> {
        self.calls.iter().rev().find_map(|call| match call {
            Call::ShowPanel(panel) => Some(*panel),
            _ => None,
        })
    }
}

impl Presenter for RecordingPresenter {
    fn render_letter(&mut self, side: GridSide, column: usize, row: usize, letter: char) {
        self.calls.push(Call::RenderLetter(side, column, row, letter));
    }

    fn clear_letter(&mut self, side: GridSide, column: usize, row: usize) {
        self.calls.push(Call::ClearLetter(side, column, row));
    }

    fn reveal_hint(&mut self, side: GridSide, column: usize, row: usize, color: HintColor) {
        self.calls.push(Call::RevealHint(side, column, row, color));
    }

    fn set_active_grid(&mut self, grid: ActiveGrid) {
        self.calls.push(Call::SetActiveGrid(grid));
    }

    fn set_sabotage_target(&mut self, side: GridSide, row: usize, enabled: bool) {
        self.calls.push(Call::SetSabotageTarget(side, row, enabled));
    }

    fn play_invalid_animation(&mut self, side: GridSide, row: usize) {
        self.calls.push(Call::PlayInvalidAnimation(side, row));
    }

    fn play_win_animation(&mut self, side: GridSide, row: usize) {
        self.calls.push(Call::PlayWinAnimation(side, row));
    }

    fn set_keyboard_hint(&mut self, letter: char, color: HintColor) {
        self.calls.push(Call::SetKeyboardHint(letter, color));
    }

    fn clear_keyboard_hints(&mut self) {
        self.calls.push(Call::ClearKeyboardHints);
    }

    fn show_panel(&mut self, panel: Panel) {
        self.calls.push(Call::ShowPanel(panel));
    }

    fn show_toast(&mut self, toast: Toast) {
        self.calls.push(Call::ShowToast(toast));
    }

    fn set_game_hint_banner(&mut self, banner: Banner) {
        self.calls.push(Call::SetGameHintBanner(banner));
    }

    fn show_room_code(&mut self, code: &str) {
        self.calls.push(Call::ShowRoomCode(code.to_string()));
    }

    fn show_solution(&mut self, word: &str) {
        self.calls.push(Call::ShowSolution(word.to_string()));
    }

    fn reset_grids(&mut self) {
        self.calls.push(Call::ResetGrids);
    }
}
