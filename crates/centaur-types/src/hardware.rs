//! Hardware-facing enumerations.
//!
//! These mirror what the board driver reports and what the remote UI
//! sends. Button codes are stable wire values: the remote UI sends them
//! as plain integers in `web_button` messages.

use crate::ErrorCode;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Unknown button code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown button code: {0}")]
pub struct ButtonCodeError(pub u8);

impl ErrorCode for ButtonCodeError {
    fn code(&self) -> &'static str {
        "BUTTON_UNKNOWN_CODE"
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

/// Physical (or web-injected) board button.
///
/// [`Button::Back`] is reserved by the plugin framework: it always stops
/// the running plugin and never reaches plugin hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Button {
    Back = 1,
    Tick = 2,
    Up = 3,
    Down = 4,
    Help = 5,
    Play = 6,
}

impl Button {
    /// All buttons in code order.
    pub const ALL: [Button; 6] = [
        Button::Back,
        Button::Tick,
        Button::Up,
        Button::Down,
        Button::Help,
        Button::Play,
    ];

    /// Wire code of this button.
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Button {
    type Error = ButtonCodeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Button::ALL
            .into_iter()
            .find(|b| b.code() == code)
            .ok_or(ButtonCodeError(code))
    }
}

impl From<Button> for u8 {
    fn from(button: Button) -> Self {
        button.code()
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Back => "BACK",
            Self::Tick => "TICK",
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Help => "HELP",
            Self::Play => "PLAY",
        };
        f.write_str(name)
    }
}

/// What happened at a field: a piece was lifted or placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PieceAction {
    Lift,
    Place,
}

/// Board buzzer sounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sound {
    Click,
    Correct,
    Wrong,
}

/// Side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// The other side.
    #[must_use]
    pub fn opponent(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

/// Generic game-session notifications forwarded to plugins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameEvent {
    NewGame,
    ResumeGame,
    Play,
    Quit,
    Termination,
}

bitflags! {
    /// Capability flags handed to a game session.
    ///
    /// ```
    /// use centaur_types::BoardOptions;
    ///
    /// let flags = BoardOptions::default();
    /// assert!(flags.contains(BoardOptions::CAN_FORCE_MOVES));
    /// assert!(flags.contains(BoardOptions::CAN_UNDO_MOVES));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct BoardOptions: u8 {
        /// The session may force a computer move onto the board.
        const CAN_FORCE_MOVES = 0b0000_0001;
        /// Taking back a move on the board undoes it in the session.
        const CAN_UNDO_MOVES  = 0b0000_0010;
    }
}

impl Default for BoardOptions {
    fn default() -> Self {
        Self::CAN_FORCE_MOVES | Self::CAN_UNDO_MOVES
    }
}
