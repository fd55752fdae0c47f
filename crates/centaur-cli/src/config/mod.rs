//! Layered configuration.
//!
//! ```text
//! Priority (highest to lowest):
//!
//! ┌────────────────────────────────────────────┐
//! │  1. CLI flags (--debug, --engine)          │
//! ├────────────────────────────────────────────┤
//! │  2. Environment Variables (CENTAUR_*)      │
//! ├────────────────────────────────────────────┤
//! │  3. Project Config (.centaur/config.toml)  │
//! ├────────────────────────────────────────────┤
//! │  4. Global Config (~/.centaur/config.toml) │
//! ├────────────────────────────────────────────┤
//! │  5. Default Values                         │
//! └────────────────────────────────────────────┘
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Config Field | Type |
//! |----------|--------------|------|
//! | `CENTAUR_DEBUG` | `debug` | bool |
//! | `CENTAUR_ENGINE_PATH` | `engine.path` | PathBuf |
//! | `CENTAUR_ENGINE_BACKOFF_MS` | `engine.backoff_ms` | u64 |
//!
//! # Example Configuration
//!
//! ```toml
//! debug = false
//!
//! [engine]
//! path = "/usr/games/stockfish"
//! max_attempts = 2
//! backoff_ms = 500
//!
//! [engine.options]
//! "Skill Level" = 5
//! ```

mod error;
mod loader;

pub use error::ConfigError;
pub use loader::ConfigLoader;

use centaur_engine::{EngineConfig, EngineConfigLayer};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Project config directory name.
pub const PROJECT_CONFIG_DIR: &str = ".centaur";

/// Config file name, in both the global and project directories.
pub const CONFIG_FILE: &str = "config.toml";

/// Default global config directory.
pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(PROJECT_CONFIG_DIR)
}

/// Default global config file path.
pub fn default_config_path() -> PathBuf {
    default_config_dir().join(CONFIG_FILE)
}

/// Resolved configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CentaurConfig {
    /// Debug logging.
    pub debug: bool,

    pub engine: EngineConfig,
}

impl CentaurConfig {
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// # Errors
    ///
    /// Returns error if deserialization fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Applies one file layer on top of this configuration.
    pub fn apply(&mut self, layer: &ConfigLayer) {
        if let Some(debug) = layer.debug {
            self.debug = debug;
        }
        self.engine.apply(&layer.engine);
    }
}

/// The contents of one config file: only the keys it actually sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub debug: Option<bool>,
    pub engine: EngineConfigLayer,
}

impl ConfigLayer {
    /// # Errors
    ///
    /// Returns error if deserialization fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}
