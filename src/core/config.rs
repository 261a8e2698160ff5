//! Build configuration for the diagnostic components.
//!
//! The diff engine and change logger only do work in development mode. The
//! mode is passed to them when they are built instead of being read from
//! process state on every call.

use std::env;

use super::constants::MODE_ENV_VAR;
use super::error::ConfigError;

/// Development or production build configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Diagnostics enabled.
    Development,
    /// Diagnostics compiled down to no-ops.
    Production,
}

impl Default for BuildMode {
    fn default() -> Self {
        Self::detect()
    }
}

impl BuildMode {
    /// Mode implied by the compilation profile (debug assertions on means development).
    pub fn detect() -> Self {
        if cfg!(debug_assertions) {
            Self::Development
        } else {
            Self::Production
        }
    }

    /// Read the mode from `STATEFUL_ACTIONS_MODE`, falling back to [`BuildMode::detect`].
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var(MODE_ENV_VAR) {
            Ok(value) => Self::parse(&value),
            Err(_) => Ok(Self::detect()),
        }
    }

    /// Parse a mode name (case-insensitive, surrounding whitespace ignored).
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(ConfigError::InvalidMode {
                var: MODE_ENV_VAR,
                value: value.to_string(),
            }),
        }
    }

    /// Whether diagnostics are active.
    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

/// Change logger configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Build mode gating all output.
    pub mode: BuildMode,

    /// Emit single-event logs (state labels, dispatched events).
    pub log_single_events: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            mode: BuildMode::detect(),
            log_single_events: true,
        }
    }
}

impl LoggerConfig {
    /// Create a configuration for the given mode.
    pub fn new(mode: BuildMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Set the build mode.
    pub fn mode(mut self, mode: BuildMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enable or disable single-event logs.
    pub fn log_single_events(mut self, enabled: bool) -> Self {
        self.log_single_events = enabled;
        self
    }
}
