//! Game session seam.
//!
//! A game session owns the board position and move legality; it lives
//! outside this crate. The plugin creates at most one through a
//! [`SessionFactory`] and receives its notifications through a
//! [`SessionListener`].

use centaur_types::{BoardOptions, Button, Color, GameEvent, Square};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// PGN header values for a new game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInfo {
    pub event: String,
    pub site: String,
    pub round: String,
    pub white: String,
    pub black: String,
}

impl GameInfo {
    /// Game info with an empty round.
    pub fn new(
        event: impl Into<String>,
        site: impl Into<String>,
        white: impl Into<String>,
        black: impl Into<String>,
    ) -> Self {
        Self {
            event: event.into(),
            site: site.into(),
            round: String::new(),
            white: white.into(),
            black: black.into(),
        }
    }
}

/// A move played in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveEvent {
    pub uci_move: String,
    pub san_move: String,
    /// Side that played the move.
    pub color: Color,
    /// Square the moved piece landed on.
    pub square: Square,
}

/// Receives session notifications.
pub trait SessionListener: Send + Sync {
    /// A button press seen by the session. Returns `true` when handled.
    fn on_key(&self, button: Button) -> bool;

    fn on_event(&self, event: GameEvent);

    /// A move was played. Returns `false` to reject it.
    fn on_move(&self, event: &MoveEvent) -> bool;
}

/// A running game.
pub trait GameSession: Send + Sync {
    /// Begins processing board events.
    fn start(&self);

    /// Ends the game and releases the board.
    fn stop(&self);

    /// Current position as FEN.
    fn board(&self) -> String;

    /// Lights up a suggested move.
    fn flash_hint(&self);

    /// Sets the move the computer wants played next.
    fn set_computer_move(&self, uci_move: &str);
}

/// Creates game sessions.
pub trait SessionFactory: Send + Sync {
    fn create(
        &self,
        info: GameInfo,
        options: BoardOptions,
        listener: Arc<dyn SessionListener>,
    ) -> Arc<dyn GameSession>;
}
