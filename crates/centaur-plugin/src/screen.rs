//! Board screen seam.

use serde::{Deserialize, Serialize};

/// Screen font.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Font {
    #[default]
    Main,
    Medium,
}

/// The e-paper screen on the board.
pub trait Screen: Send + Sync {
    /// Clears the text area.
    fn clear_area(&self);

    /// Writes `text` on the given 1-based row.
    fn write_text(&self, row: u8, text: &str, font: Font);

    fn set_battery_value(&self, level: u8);
}
