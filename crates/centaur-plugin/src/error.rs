//! Plugin layer errors.
//!
//! All plugin errors use the `PLUGIN_` prefix:
//!
//! | Error | Code | Recoverable |
//! |-------|------|-------------|
//! | [`SessionNotStarted`](PluginError::SessionNotStarted) | `PLUGIN_SESSION_NOT_STARTED` | No |
//! | [`Stopped`](PluginError::Stopped) | `PLUGIN_STOPPED` | No |
//! | [`InvalidSquare`](PluginError::InvalidSquare) | `PLUGIN_INVALID_SQUARE` | No |
//! | [`InvalidButton`](PluginError::InvalidButton) | `PLUGIN_INVALID_BUTTON` | No |
//! | [`MalformedMessage`](PluginError::MalformedMessage) | `PLUGIN_MALFORMED_MESSAGE` | No |
//! | [`Hook`](PluginError::Hook) | `PLUGIN_HOOK_FAILED` | Yes |
//!
//! `SessionNotStarted` and `Stopped` indicate plugin misuse and are always
//! returned to the caller. The others are mostly raised while routing
//! events, where the router logs them and carries on.
//!
//! # Example
//!
//! ```
//! use centaur_plugin::PluginError;
//! use centaur_types::ErrorCode;
//!
//! let err = PluginError::SessionNotStarted;
//! assert_eq!(err.code(), "PLUGIN_SESSION_NOT_STARTED");
//! assert!(!err.is_recoverable());
//! ```

use centaur_types::{ButtonCodeError, ErrorCode, SquareError};
use thiserror::Error;

/// Plugin layer error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluginError {
    /// A session-dependent operation was called before `start_engine`.
    #[error("game session not started")]
    SessionNotStarted,

    /// The plugin has been stopped.
    #[error("plugin already stopped")]
    Stopped,

    #[error("invalid square: {0}")]
    InvalidSquare(#[from] SquareError),

    #[error("invalid button: {0}")]
    InvalidButton(#[from] ButtonCodeError),

    /// A remote-UI message field could not be decoded.
    #[error("malformed '{key}' in remote message: {reason}")]
    MalformedMessage { key: String, reason: String },

    /// A plugin hook reported a failure.
    #[error("hook failed: {0}")]
    Hook(String),
}

impl PluginError {
    /// Creates a hook failure. Intended for plugin hook implementations.
    pub fn hook(message: impl Into<String>) -> Self {
        Self::Hook(message.into())
    }

    pub(crate) fn malformed(key: &str, reason: impl ToString) -> Self {
        Self::MalformedMessage {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl ErrorCode for PluginError {
    fn code(&self) -> &'static str {
        match self {
            Self::SessionNotStarted => "PLUGIN_SESSION_NOT_STARTED",
            Self::Stopped => "PLUGIN_STOPPED",
            Self::InvalidSquare(_) => "PLUGIN_INVALID_SQUARE",
            Self::InvalidButton(_) => "PLUGIN_INVALID_BUTTON",
            Self::MalformedMessage { .. } => "PLUGIN_MALFORMED_MESSAGE",
            Self::Hook(_) => "PLUGIN_HOOK_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Hook(_))
    }
}
