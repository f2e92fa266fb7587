//! Runtime error types.

use std::path::PathBuf;

use thiserror::Error;

use cinder_framework::RegistryError;

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested configuration file does not exist.
    #[error("configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// The merged configuration could not be parsed into the schema.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] figment::Error),
}

/// Top-level runtime errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A plugin lifecycle or registration operation failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
