//! Engine layer errors.
//!
//! | Variant | Code | Recoverable |
//! |---------|------|-------------|
//! | [`EngineError::MissingPath`] | `ENGINE_MISSING_PATH` | No |
//! | [`EngineError::SpawnFailed`] | `ENGINE_SPAWN_FAILED` | Yes |
//! | [`EngineError::Io`] | `ENGINE_IO` | Yes |
//! | [`EngineError::Protocol`] | `ENGINE_PROTOCOL` | Yes |
//! | [`EngineError::Timeout`] | `ENGINE_TIMEOUT` | Yes |
//! | [`EngineError::Terminated`] | `ENGINE_TERMINATED` | Yes |
//!
//! Only [`EngineError::MissingPath`] ever reaches callers of the
//! [`EngineSupervisor`](crate::EngineSupervisor): it is raised at
//! construction. Everything else is logged inside the retry loop and folded
//! into [`EngineReply::NoResult`](crate::EngineReply::NoResult).

use centaur_types::ErrorCode;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors from engine processes.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No engine executable configured.
    #[error("engine path is not configured")]
    MissingPath,

    /// The engine binary could not be launched.
    #[error("failed to spawn engine '{path}': {source}")]
    SpawnFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to the engine pipes failed.
    #[error("engine i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The engine sent something we could not make sense of.
    #[error("engine protocol error: {0}")]
    Protocol(String),

    /// No answer within the allowed time.
    #[error("engine did not answer within {0:?}")]
    Timeout(Duration),

    /// The engine process exited or closed its output.
    #[error("engine process terminated")]
    Terminated,
}

impl EngineError {
    /// Creates a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }
}

impl ErrorCode for EngineError {
    fn code(&self) -> &'static str {
        match self {
            Self::MissingPath => "ENGINE_MISSING_PATH",
            Self::SpawnFailed { .. } => "ENGINE_SPAWN_FAILED",
            Self::Io(_) => "ENGINE_IO",
            Self::Protocol(_) => "ENGINE_PROTOCOL",
            Self::Timeout(_) => "ENGINE_TIMEOUT",
            Self::Terminated => "ENGINE_TERMINATED",
        }
    }

    fn is_recoverable(&self) -> bool {
        !matches!(self, Self::MissingPath)
    }
}
