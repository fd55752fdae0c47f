//! External chess engine supervision.
//!
//! Drives a UCI engine as a child process and shields callers from its
//! failures: a crashed, hung or missing engine is respawned a bounded number
//! of times, and a request that cannot be served yields
//! [`EngineReply::NoResult`] instead of an error.
//!
//! # Architecture
//!
//! ```text
//! config.toml [engine]
//!   → EngineConfig (path, args, options, retry settings)
//!   → EngineSupervisor::new(config)       MissingPath is the only error
//!   → analyse / play
//!       → EngineSpawner::spawn            UciSpawner in production
//!       → EngineProcess (UciProcess)      uci / isready / position / go
//!       → Ready(T) | NoResult
//! ```
//!
//! # Example
//!
//! ```no_run
//! use centaur_engine::{EngineConfig, EngineSupervisor, InfoFlags, Limit, Position};
//! use std::time::Duration;
//!
//! let engine = EngineSupervisor::new(
//!     EngineConfig::new("/usr/games/stockfish").with_option("Skill Level", 5),
//! )?;
//!
//! let position = Position::startpos().with_moves(["e2e4"]);
//! let reply = engine.play(&position, &Limit::time(Duration::from_secs(1)), InfoFlags::NONE);
//! if let Some(result) = reply.into_option() {
//!     println!("engine plays {:?}", result.best_move);
//! }
//! engine.quit();
//! # Ok::<(), centaur_engine::EngineError>(())
//! ```

mod config;
mod error;
mod process;
mod retry;
mod search;
mod supervisor;
mod uci;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use config::{
    EngineConfig, EngineConfigLayer, EngineOptions, OptionValue, DEFAULT_BACKOFF_MS,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_RESPONSE_TIMEOUT_MS,
};
pub use error::EngineError;
pub use process::{EngineProcess, EngineSpawner, UciSpawner};
pub use retry::{retry_bounded, Backoff, RetryPolicy};
pub use search::{AnalysisInfo, EngineReply, InfoFlags, Limit, PlayResult, Position, Score};
pub use supervisor::EngineSupervisor;
pub use uci::UciProcess;
