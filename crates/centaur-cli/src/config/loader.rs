//! Configuration loader with hierarchical merging.
//!
//! # Load Order
//!
//! 1. Default values
//! 2. Global config (`~/.centaur/config.toml`)
//! 3. Project config (`<project>/.centaur/config.toml`)
//! 4. Environment variables (`CENTAUR_*`)
//!
//! Each layer overrides the previous. CLI flags are applied by the binary
//! on top of the result.

use super::{
    default_config_path, CentaurConfig, ConfigError, ConfigLayer, CONFIG_FILE, PROJECT_CONFIG_DIR,
};
use centaur_engine::OptionValue;
use std::path::{Path, PathBuf};
use tracing::debug;

macro_rules! parse_env_bool {
    ($field:expr, $var:literal) => {
        if let Ok(val) = std::env::var($var) {
            $field = parse_bool(&val)
                .ok_or_else(|| ConfigError::invalid_env_var($var, "expected bool"))?;
        }
    };
}

/// Configuration loader with builder pattern.
///
/// ```no_run
/// use centaur_cli::config::ConfigLoader;
///
/// let config = ConfigLoader::new()
///     .with_project_root("/home/pi/plugins/coach")
///     .skip_env_vars()
///     .load()?;
/// # Ok::<(), centaur_cli::config::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    global_config_path: Option<PathBuf>,
    project_root: Option<PathBuf>,
    skip_env: bool,
    skip_global: bool,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom global config path.
    #[must_use]
    pub fn with_global_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config_path = Some(path.into());
        self
    }

    /// Project config is read from `<path>/.centaur/config.toml`.
    #[must_use]
    pub fn with_project_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_root = Some(path.into());
        self
    }

    #[must_use]
    pub fn skip_env_vars(mut self) -> Self {
        self.skip_env = true;
        self
    }

    #[must_use]
    pub fn skip_global_config(mut self) -> Self {
        self.skip_global = true;
        self
    }

    /// Loads and merges configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a config file exists but cannot be read
    /// or parsed, an environment variable is malformed, or the resolved
    /// engine settings are unusable. Missing files are ignored.
    pub fn load(&self) -> Result<CentaurConfig, ConfigError> {
        let mut config = CentaurConfig::default();

        if !self.skip_global {
            let global_path = self
                .global_config_path
                .clone()
                .unwrap_or_else(default_config_path);

            if let Some(global) = load_file(&global_path)? {
                debug!(path = %global_path.display(), "Loaded global config");
                config.apply(&global);
            }
        }

        if let Some(ref project_root) = self.project_root {
            let path = project_root.join(PROJECT_CONFIG_DIR).join(CONFIG_FILE);
            if let Some(project) = load_file(&path)? {
                debug!(path = %path.display(), "Loaded project config");
                config.apply(&project);
            }
        }

        if !self.skip_env {
            apply_env_vars(&mut config)?;
        }

        validate(&config)?;
        Ok(config)
    }
}

fn load_file(path: &Path) -> Result<Option<ConfigLayer>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
    let layer = ConfigLayer::from_toml(&content).map_err(|e| ConfigError::parse_toml(path, e))?;
    Ok(Some(layer))
}

fn apply_env_vars(config: &mut CentaurConfig) -> Result<(), ConfigError> {
    parse_env_bool!(config.debug, "CENTAUR_DEBUG");

    if let Ok(val) = std::env::var("CENTAUR_ENGINE_PATH") {
        config.engine.path = Some(PathBuf::from(val));
    }

    if let Ok(val) = std::env::var("CENTAUR_ENGINE_BACKOFF_MS") {
        config.engine.backoff_ms = val.trim().parse().map_err(|_| {
            ConfigError::invalid_env_var("CENTAUR_ENGINE_BACKOFF_MS", "expected milliseconds")
        })?;
    }

    Ok(())
}

/// Rejects settings that would break the engine exchange: every option is
/// sent as one `setoption` line, so names and values must stay on one line.
fn validate(config: &CentaurConfig) -> Result<(), ConfigError> {
    let engine = &config.engine;

    if engine.max_attempts == 0 {
        return Err(ConfigError::invalid_engine_setting(
            "engine.max_attempts",
            "must be at least 1",
        ));
    }

    for (name, value) in &engine.options {
        let field = format!("engine.options.{name}");
        if name.trim().is_empty() {
            return Err(ConfigError::invalid_engine_setting(field, "option name is empty"));
        }
        if name.contains(['\n', '\r']) {
            return Err(ConfigError::invalid_engine_setting(
                field,
                "option name contains a line break",
            ));
        }
        if let OptionValue::Text(text) = value {
            if text.contains(['\n', '\r']) {
                return Err(ConfigError::invalid_engine_setting(
                    field,
                    "value contains a line break",
                ));
            }
        }
    }

    Ok(())
}

/// Accepts `true/false`, `1/0`, `yes/no`, `on/off` (case-insensitive).
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
