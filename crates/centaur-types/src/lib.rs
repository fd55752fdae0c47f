//! Core types for the Centaur plugin core.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  centaur-types  : Square, Button, PieceAction, ErrorCode    │ ◄── HERE
//! ├─────────────────────────────────────────────────────────────┤
//! │  centaur-engine : EngineSupervisor, UCI process driver      │
//! │  centaur-plugin : Plugin event router, hooks, collaborators │
//! ├─────────────────────────────────────────────────────────────┤
//! │  centaur-cli    : `centaur` binary                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! This crate has no knowledge of engines or plugins. It only defines the
//! vocabulary shared by the hardware driver, the remote UI and plugins.

mod error;
mod hardware;
mod square;

pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use hardware::{
    BoardOptions, Button, ButtonCodeError, Color, GameEvent, PieceAction, Sound,
};
pub use square::{split_uci_move, Square, SquareError, SQUARE_COUNT};
