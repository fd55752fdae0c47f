//! Engine configuration.
//!
//! Deserialized from the `[engine]` section of `config.toml`:
//!
//! ```toml
//! [engine]
//! path = "/opt/engines/stockfish"
//! args = []
//! max_attempts = 2
//! backoff_ms = 500
//! response_timeout_ms = 30000
//!
//! [engine.options]
//! Threads = 1
//! Hash = 64
//! UCI_LimitStrength = true
//! UCI_Elo = 1500
//! ```

use crate::error::EngineError;
use crate::retry::{Backoff, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default number of attempts per engine request.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Default pause between attempts.
pub const DEFAULT_BACKOFF_MS: u64 = 500;

/// Default grace on top of the search time before an engine is considered hung.
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 30_000;

/// A single UCI option value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Option name → value, applied in name order on every spawn.
pub type EngineOptions = BTreeMap<String, OptionValue>;

/// How to launch and drive one engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine executable.
    pub path: Option<PathBuf>,

    /// Extra command-line arguments.
    pub args: Vec<String>,

    /// UCI options applied after each spawn.
    pub options: EngineOptions,

    /// Attempts per request before giving up with no result.
    pub max_attempts: u32,

    /// Pause between attempts in milliseconds.
    pub backoff_ms: u64,

    /// Grace on top of the search time before the engine is stopped.
    pub response_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: None,
            args: Vec::new(),
            options: EngineOptions::new(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_ms: DEFAULT_BACKOFF_MS,
            response_timeout_ms: DEFAULT_RESPONSE_TIMEOUT_MS,
        }
    }
}

impl EngineConfig {
    /// Config for the executable at `path` with default retry settings.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Sets command-line arguments.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Sets one UCI option.
    #[must_use]
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    /// Sets the pause between attempts.
    #[must_use]
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Returns the configured executable.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingPath`] when the path is unset or empty.
    pub fn validated_path(&self) -> Result<&Path, EngineError> {
        match self.path.as_deref() {
            Some(path) if !path.as_os_str().is_empty() => Ok(path),
            _ => Err(EngineError::MissingPath),
        }
    }

    /// Retry policy derived from `max_attempts` and `backoff_ms`.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Backoff::Fixed(Duration::from_millis(self.backoff_ms)),
        )
    }

    /// Grace on top of the search time.
    #[must_use]
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    /// Applies one configuration layer. Every field present in `layer`
    /// overrides; options are merged by name.
    pub fn apply(&mut self, layer: &EngineConfigLayer) {
        if let Some(path) = &layer.path {
            self.path = Some(path.clone());
        }
        if let Some(args) = &layer.args {
            self.args.clone_from(args);
        }
        for (name, value) in &layer.options {
            self.options.insert(name.clone(), value.clone());
        }
        if let Some(max_attempts) = layer.max_attempts {
            self.max_attempts = max_attempts;
        }
        if let Some(backoff_ms) = layer.backoff_ms {
            self.backoff_ms = backoff_ms;
        }
        if let Some(response_timeout_ms) = layer.response_timeout_ms {
            self.response_timeout_ms = response_timeout_ms;
        }
    }
}

/// One partial `[engine]` section, as written in a single config file.
///
/// Absent keys stay `None` and leave the lower layer untouched; a key set
/// to its default value still overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfigLayer {
    pub path: Option<PathBuf>,
    pub args: Option<Vec<String>>,
    pub options: EngineOptions,
    pub max_attempts: Option<u32>,
    pub backoff_ms: Option<u64>,
    pub response_timeout_ms: Option<u64>,
}
