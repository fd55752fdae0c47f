//! Display, LED and sound helper for plugins.

use crate::board::BoardDriver;
use crate::error::PluginError;
use crate::remote::{RemoteUi, UiUpdate};
use crate::screen::{Font, Screen};
use centaur_types::{split_uci_move, Sound, Square};
use parking_lot::Mutex;
use std::sync::Arc;

/// Row the cursor returns to after [`Centaur::clear_screen`].
pub const FIRST_ROW: u8 = 1;

/// Row used by [`Centaur::header`].
pub const HEADER_ROW: u8 = 1;

/// Convenience wrapper over the board, screen and remote UI.
///
/// Keeps a text cursor: [`print`](Self::print) writes at the cursor row and
/// moves it down one line.
pub struct Centaur {
    board: Arc<dyn BoardDriver>,
    screen: Arc<dyn Screen>,
    remote: Arc<dyn RemoteUi>,
    row: Mutex<u8>,
}

impl Centaur {
    pub fn new(
        board: Arc<dyn BoardDriver>,
        screen: Arc<dyn Screen>,
        remote: Arc<dyn RemoteUi>,
    ) -> Self {
        Self {
            board,
            screen,
            remote,
            row: Mutex::new(FIRST_ROW),
        }
    }

    /// Clears the screen and resets the cursor.
    pub fn clear_screen(&self) {
        self.screen.clear_area();
        *self.row.lock() = FIRST_ROW;
    }

    /// Writes a line in the main font at the cursor.
    pub fn print(&self, text: &str) {
        self.print_at(text, None, Font::Main);
    }

    /// Writes a line, first moving the cursor to `row` if given.
    pub fn print_at(&self, text: &str, row: Option<u8>, font: Font) {
        let mut cursor = self.row.lock();
        if let Some(row) = row {
            *cursor = row;
        }
        self.screen.write_text(*cursor, text, font);
        *cursor = cursor.saturating_add(1);
    }

    /// Row the next [`print`](Self::print) writes to.
    pub fn current_row(&self) -> u8 {
        *self.row.lock()
    }

    pub fn flash(&self, square: Square) {
        self.board.led(square);
    }

    /// Lights the from and to squares of a UCI move.
    ///
    /// # Errors
    ///
    /// [`PluginError::InvalidSquare`] if `uci_move` does not start with two
    /// square names.
    pub fn light_move(&self, uci_move: &str) -> Result<(), PluginError> {
        let (from, to) = split_uci_move(uci_move)?;
        self.board.led_from_to(from, to);
        Ok(())
    }

    pub fn lights_off(&self) {
        self.board.leds_off();
    }

    pub fn sound(&self, sound: Sound) {
        self.board.beep(sound);
    }

    /// Writes `text` on the header row and sets the web caption to
    /// `web_text`, or to `text` when absent. The cursor is not moved.
    pub fn header(&self, text: &str, web_text: Option<&str>) {
        self.screen.write_text(HEADER_ROW, text, Font::Medium);
        self.remote
            .send_message(&UiUpdate::caption(web_text.unwrap_or(text)));
    }
}
