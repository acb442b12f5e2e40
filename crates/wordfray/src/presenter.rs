//! A presenter that renders every call as a log line.

use wordfray_protocol::HintColor;
use wordfray_turn::{ActiveGrid, Banner, GridSide, Panel, Presenter, Toast};

/// Logs presenter calls through `tracing`, at `info` for what a player
/// would notice and `debug` for cell-level drawing.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPresenter;

impl Presenter for TracingPresenter {
    fn render_letter(&mut self, side: GridSide, column: usize, row: usize, letter: char) {
        tracing::debug!(?side, column, row, %letter, "letter");
    }

    fn clear_letter(&mut self, side: GridSide, column: usize, row: usize) {
        tracing::debug!(?side, column, row, "letter cleared");
    }

    fn reveal_hint(&mut self, side: GridSide, column: usize, row: usize, color: HintColor) {
        tracing::info!(?side, column, row, %color, "hint");
    }

    fn set_active_grid(&mut self, grid: ActiveGrid) {
        tracing::debug!(?grid, "active grid");
    }

    fn set_sabotage_target(&mut self, side: GridSide, row: usize, enabled: bool) {
        tracing::debug!(?side, row, enabled, "sabotage target");
    }

    fn play_invalid_animation(&mut self, side: GridSide, row: usize) {
        tracing::info!(?side, row, "invalid word");
    }

    fn play_win_animation(&mut self, side: GridSide, row: usize) {
        tracing::info!(?side, row, "winning row");
    }

    fn set_keyboard_hint(&mut self, letter: char, color: HintColor) {
        tracing::debug!(%letter, %color, "keyboard");
    }

    fn clear_keyboard_hints(&mut self) {
        tracing::debug!("keyboard cleared");
    }

    fn show_panel(&mut self, panel: Panel) {
        tracing::info!(?panel, "panel");
    }

    fn show_toast(&mut self, toast: Toast) {
        tracing::info!(?toast, "toast");
    }

    fn set_game_hint_banner(&mut self, banner: Banner) {
        tracing::info!(?banner, "banner");
    }

    fn show_room_code(&mut self, code: &str) {
        tracing::info!(%code, "room created, share this code");
    }

    fn show_solution(&mut self, word: &str) {
        tracing::info!(%word, "solution");
    }

    fn reset_grids(&mut self) {
        tracing::debug!("grids reset");
    }
}
