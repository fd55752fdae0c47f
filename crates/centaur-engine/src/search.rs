//! Search requests and results.
//!
//! The engine never sees a board object: a [`Position`] is what UCI needs
//! to reconstruct one (a start FEN plus the moves played since), and a
//! [`Limit`] bounds the search.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Position to search, in UCI terms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Start FEN. `None` means the standard starting position.
    pub fen: Option<String>,
    /// Moves played from the start position, in UCI notation.
    pub moves: Vec<String>,
}

impl Position {
    /// The standard starting position.
    #[must_use]
    pub fn startpos() -> Self {
        Self::default()
    }

    /// A position given by FEN.
    pub fn from_fen(fen: impl Into<String>) -> Self {
        Self {
            fen: Some(fen.into()),
            moves: Vec::new(),
        }
    }

    /// Appends moves played from the start position.
    #[must_use]
    pub fn with_moves<I, S>(mut self, moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.moves.extend(moves.into_iter().map(Into::into));
        self
    }

    /// Appends a single move.
    pub fn push_move(&mut self, uci_move: impl Into<String>) {
        self.moves.push(uci_move.into());
    }

    /// The `position ...` command line.
    #[must_use]
    pub fn to_uci_command(&self) -> String {
        let mut cmd = match &self.fen {
            Some(fen) => format!("position fen {fen}"),
            None => "position startpos".to_string(),
        };
        if !self.moves.is_empty() {
            cmd.push_str(" moves ");
            cmd.push_str(&self.moves.join(" "));
        }
        cmd
    }
}

/// Search constraint. Any combination may be set; the engine stops at
/// whichever bound it reaches first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limit {
    /// Time budget for this move.
    pub time: Option<Duration>,
    /// Maximum search depth in plies.
    pub depth: Option<u32>,
    /// Maximum nodes searched.
    pub nodes: Option<u64>,
    /// Search for a mate in this many moves.
    pub mate: Option<u32>,
}

impl Limit {
    /// Limit by time.
    #[must_use]
    pub fn time(time: Duration) -> Self {
        Self {
            time: Some(time),
            ..Self::default()
        }
    }

    /// Limit by depth.
    #[must_use]
    pub fn depth(depth: u32) -> Self {
        Self {
            depth: Some(depth),
            ..Self::default()
        }
    }

    /// Limit by nodes.
    #[must_use]
    pub fn nodes(nodes: u64) -> Self {
        Self {
            nodes: Some(nodes),
            ..Self::default()
        }
    }

    /// Adds a depth bound.
    #[must_use]
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Adds a time bound.
    #[must_use]
    pub fn with_time(mut self, time: Duration) -> Self {
        self.time = Some(time);
        self
    }

    /// True when no bound is set; the engine then searches until stopped.
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.time.is_none() && self.depth.is_none() && self.nodes.is_none() && self.mate.is_none()
    }

    /// The `go ...` command line.
    #[must_use]
    pub fn to_go_command(&self) -> String {
        let mut cmd = String::from("go");
        if let Some(time) = self.time {
            cmd.push_str(&format!(" movetime {}", time.as_millis().max(1)));
        }
        if let Some(depth) = self.depth {
            cmd.push_str(&format!(" depth {depth}"));
        }
        if let Some(nodes) = self.nodes {
            cmd.push_str(&format!(" nodes {nodes}"));
        }
        if let Some(mate) = self.mate {
            cmd.push_str(&format!(" mate {mate}"));
        }
        if self.is_unbounded() {
            cmd.push_str(" infinite");
        }
        cmd
    }
}

bitflags! {
    /// Which parts of the analysis record to return alongside a played move.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct InfoFlags: u8 {
        /// Depth and node count.
        const BASIC = 0b001;
        const SCORE = 0b010;
        const PV    = 0b100;
        const ALL   = Self::BASIC.bits() | Self::SCORE.bits() | Self::PV.bits();
    }
}

impl InfoFlags {
    /// Move only.
    pub const NONE: Self = Self::empty();
}

impl Default for InfoFlags {
    fn default() -> Self {
        Self::NONE
    }
}

/// Engine evaluation from the side to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Score {
    /// Centipawns.
    Cp(i32),
    /// Mate in N moves (negative: getting mated).
    Mate(i32),
}

impl std::fmt::Display for Score {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cp(cp) => write!(f, "cp {cp}"),
            Self::Mate(n) => write!(f, "mate {n}"),
        }
    }
}

/// Analysis record: the latest `info` reported before `bestmove`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisInfo {
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
    pub score: Option<Score>,
    /// Principal variation in UCI notation.
    pub pv: Vec<String>,
}

impl AnalysisInfo {
    /// Keeps only the parts selected by `flags`.
    #[must_use]
    pub fn filtered(&self, flags: InfoFlags) -> Self {
        Self {
            depth: self.depth.filter(|_| flags.contains(InfoFlags::BASIC)),
            nodes: self.nodes.filter(|_| flags.contains(InfoFlags::BASIC)),
            score: self.score.filter(|_| flags.contains(InfoFlags::SCORE)),
            pv: if flags.contains(InfoFlags::PV) {
                self.pv.clone()
            } else {
                Vec::new()
            },
        }
    }
}

/// A move chosen by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayResult {
    /// Best move; `None` when the engine reports `(none)` (no legal move).
    pub best_move: Option<String>,
    /// Expected reply.
    pub ponder: Option<String>,
    /// Analysis record, present when info flags were requested.
    pub info: Option<AnalysisInfo>,
}

/// Outcome of a supervised engine request.
///
/// `NoResult` means every attempt failed. It is not an error: callers
/// should try again later.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum EngineReply<T> {
    Ready(T),
    NoResult,
}

impl<T> EngineReply<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn is_no_result(&self) -> bool {
        matches!(self, Self::NoResult)
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::NoResult => None,
        }
    }

    pub fn as_ref(&self) -> EngineReply<&T> {
        match self {
            Self::Ready(value) => EngineReply::Ready(value),
            Self::NoResult => EngineReply::NoResult,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> EngineReply<U> {
        match self {
            Self::Ready(value) => EngineReply::Ready(f(value)),
            Self::NoResult => EngineReply::NoResult,
        }
    }
}

impl<T> From<Option<T>> for EngineReply<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Ready(v),
            None => Self::NoResult,
        }
    }
}
