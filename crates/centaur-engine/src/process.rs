//! Engine process seam.
//!
//! The supervisor only talks to engines through [`EngineProcess`] and
//! creates them through an [`EngineSpawner`]. Production code uses
//! [`UciSpawner`]; tests substitute a scripted spawner.

use crate::config::{EngineConfig, EngineOptions};
use crate::error::EngineError;
use crate::search::{AnalysisInfo, InfoFlags, Limit, PlayResult, Position};
use crate::uci::UciProcess;

/// One running engine.
///
/// Calls block until the engine answers or its deadline passes. Any error
/// leaves the process in an unknown state; the supervisor discards it.
pub trait EngineProcess: Send {
    /// Engine name as reported during the handshake.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Applies options before first use.
    fn configure(&mut self, options: &EngineOptions) -> Result<(), EngineError>;

    /// Searches `position` and returns the final analysis record.
    fn analyse(&mut self, position: &Position, limit: &Limit) -> Result<AnalysisInfo, EngineError>;

    /// Searches `position` and returns the chosen move.
    fn play(
        &mut self,
        position: &Position,
        limit: &Limit,
        info: InfoFlags,
    ) -> Result<PlayResult, EngineError>;

    /// Asks the engine to exit.
    fn quit(&mut self) -> Result<(), EngineError>;
}

/// Creates engine processes.
pub trait EngineSpawner: Send + Sync {
    /// Launches the engine described by `config`.
    fn spawn(&self, config: &EngineConfig) -> Result<Box<dyn EngineProcess>, EngineError>;
}

/// Spawns real UCI engines as child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct UciSpawner;

impl EngineSpawner for UciSpawner {
    fn spawn(&self, config: &EngineConfig) -> Result<Box<dyn EngineProcess>, EngineError> {
        let path = config.validated_path()?;
        let process = UciProcess::spawn(path, &config.args, config.response_timeout())?;
        Ok(Box::new(process))
    }
}
