//! Board square addressing.
//!
//! A [`Square`] is one of the 64 board cells. Two addressing schemes are
//! in use and they are total inverses of each other:
//!
//! | Scheme | Range | Used by |
//! |--------|-------|---------|
//! | Index | `0..=63` (`a1 = 0`, `h1 = 7`, `a8 = 56`, `h8 = 63`) | Board driver, LEDs |
//! | Algebraic | `"a1"`..`"h8"` | Hooks, remote UI, UCI moves |
//!
//! # Example
//!
//! ```
//! use centaur_types::Square;
//!
//! let e2: Square = "e2".parse().unwrap();
//! assert_eq!(e2.index(), 12);
//! assert_eq!(Square::new(12).unwrap().to_string(), "e2");
//! ```

use crate::ErrorCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of squares on the board.
pub const SQUARE_COUNT: u8 = 64;

const FILES: &[u8; 8] = b"abcdefgh";
const RANKS: &[u8; 8] = b"12345678";

/// Square addressing error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SquareError {
    /// Index outside `0..=63`.
    #[error("square index out of range: {0}")]
    IndexOutOfRange(u8),

    /// Text that is not two-character algebraic notation.
    #[error("invalid square name: {0:?}")]
    InvalidName(String),
}

impl ErrorCode for SquareError {
    fn code(&self) -> &'static str {
        match self {
            Self::IndexOutOfRange(_) => "SQUARE_INDEX_OUT_OF_RANGE",
            Self::InvalidName(_) => "SQUARE_INVALID_NAME",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

/// One of the 64 board cells.
///
/// Serialized as algebraic notation (`"e4"`), which is what the remote UI
/// sends and expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square(u8);

impl Square {
    /// Creates a square from its `0..=63` index.
    ///
    /// # Errors
    ///
    /// Returns [`SquareError::IndexOutOfRange`] for indices above 63.
    pub fn new(index: u8) -> Result<Self, SquareError> {
        if index < SQUARE_COUNT {
            Ok(Self(index))
        } else {
            Err(SquareError::IndexOutOfRange(index))
        }
    }

    /// Creates a square from zero-based file (`a = 0`) and rank (`1 = 0`).
    ///
    /// # Errors
    ///
    /// Returns [`SquareError::InvalidName`] if either coordinate exceeds 7.
    pub fn from_coords(file: u8, rank: u8) -> Result<Self, SquareError> {
        if file > 7 || rank > 7 {
            return Err(SquareError::InvalidName(format!("file {file}, rank {rank}")));
        }
        Ok(Self(rank * 8 + file))
    }

    /// Returns the `0..=63` index.
    #[must_use]
    pub fn index(self) -> u8 {
        self.0
    }

    /// Zero-based file (`a = 0`).
    #[must_use]
    pub fn file(self) -> u8 {
        self.0 % 8
    }

    /// Zero-based rank (`1 = 0`).
    #[must_use]
    pub fn rank(self) -> u8 {
        self.0 / 8
    }

    /// Algebraic name, e.g. `"e4"`.
    #[must_use]
    pub fn name(self) -> String {
        self.to_string()
    }

    /// Iterates all 64 squares in index order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..SQUARE_COUNT).map(Square)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = FILES[usize::from(self.file())] as char;
        let rank = RANKS[usize::from(self.rank())] as char;
        write!(f, "{file}{rank}")
    }
}

impl FromStr for Square {
    type Err = SquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(SquareError::InvalidName(s.to_string()));
        }
        let file = FILES
            .iter()
            .position(|f| *f == bytes[0].to_ascii_lowercase())
            .ok_or_else(|| SquareError::InvalidName(s.to_string()))?;
        let rank = RANKS
            .iter()
            .position(|r| *r == bytes[1])
            .ok_or_else(|| SquareError::InvalidName(s.to_string()))?;

        // Both positions are < 8, so the casts cannot truncate.
        Self::from_coords(file as u8, rank as u8)
    }
}

impl TryFrom<String> for Square {
    type Error = SquareError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<u8> for Square {
    type Error = SquareError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Square> for String {
    fn from(square: Square) -> Self {
        square.to_string()
    }
}

impl From<Square> for u8 {
    fn from(square: Square) -> Self {
        square.0
    }
}

/// Splits a UCI move (`"e2e4"`, `"e7e8q"`) into its from/to squares.
///
/// # Errors
///
/// Returns [`SquareError::InvalidName`] if the move is shorter than four
/// characters or either half is not a square.
pub fn split_uci_move(uci_move: &str) -> Result<(Square, Square), SquareError> {
    let from = uci_move
        .get(0..2)
        .ok_or_else(|| SquareError::InvalidName(uci_move.to_string()))?;
    let to = uci_move
        .get(2..4)
        .ok_or_else(|| SquareError::InvalidName(uci_move.to_string()))?;
    Ok((from.parse()?, to.parse()?))
}
