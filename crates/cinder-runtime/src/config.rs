//! Host configuration.
//!
//! Configuration is layered, later sources overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. A YAML file (`cinder.yaml` in the working directory, or an explicit
//!    path)
//! 3. Environment variables with the `CINDER_` prefix and `__` as the
//!    section separator, e.g. `CINDER_LOGGING__LEVEL=debug` →
//!    `logging.level = "debug"`
//!
//! Per-plugin sections under `plugins` are kept opaque; each is handed to
//! its plugin's `setup` hook as raw JSON.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ConfigError;

/// Root configuration for a Cinder host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Marker that distinguishes commands from ordinary chat.
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,

    /// Channel category commands are confined to (descriptors with the
    /// run-anywhere flag ignore it).
    #[serde(default = "default_command_category")]
    pub command_category: String,

    /// Channel category whose events are discarded wholesale.
    #[serde(default = "default_excluded_category")]
    pub excluded_category: String,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Opaque per-plugin configuration sections, keyed by plugin name.
    #[serde(default)]
    pub plugins: HashMap<String, serde_json::Value>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            command_prefix: default_command_prefix(),
            command_category: default_command_category(),
            excluded_category: default_excluded_category(),
            logging: LoggingConfig::default(),
            plugins: HashMap::new(),
        }
    }
}

fn default_command_prefix() -> String {
    "!".to_string()
}

fn default_command_category() -> String {
    "commands".to_string()
}

fn default_excluded_category() -> String {
    "noread".to_string()
}

impl HostConfig {
    /// Loads configuration from the default locations.
    ///
    /// Searches the working directory for `cinder.yaml` / `cinder.yml`, then
    /// applies `CINDER_*` environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        let mut found = false;
        for name in ["cinder.yaml", "cinder.yml"] {
            let path = Path::new(name);
            if path.exists() {
                debug!(path = %path.display(), "Loading configuration file");
                figment = figment.merge(Yaml::file(path));
                found = true;
                break;
            }
        }
        if !found {
            warn!("No configuration file found, using defaults");
        }
        Self::extract(figment.merge(Self::env_provider()))
    }

    /// Loads configuration from a specific file, then environment overrides.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path));
        }
        let figment = Figment::from(Serialized::defaults(Self::default()))
            .merge(Yaml::file(path))
            .merge(Self::env_provider());
        Self::extract(figment)
    }

    /// The configuration section for one plugin, `Null` if absent.
    pub fn plugin_section(&self, plugin: &str) -> serde_json::Value {
        self.plugins
            .get(plugin)
            .cloned()
            .unwrap_or(serde_json::Value::Null)
    }

    fn env_provider() -> Env {
        Env::prefixed("CINDER_")
            .split("__")
            .map(|key| key.as_str().replace("__", ".").into())
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        debug!(
            prefix = %config.command_prefix,
            logging_level = config.logging.level.as_str(),
            "Configuration loaded"
        );
        Ok(config)
    }
}

// =============================================================================
// Logging configuration
// =============================================================================

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Base log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include thread IDs in log output.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include source file and line number in log output.
    #[serde(default)]
    pub file_location: bool,

    /// Per-module level overrides, e.g. `cinder_framework: debug`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,
}

/// Log verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// The level as a lowercase filter-directive string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to a `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line compact output.
    #[default]
    Compact,
    /// Default multi-field output.
    Full,
    /// Multi-line human-friendly output.
    Pretty,
    /// Newline-delimited JSON (requires the `json-log` feature).
    Json,
}
