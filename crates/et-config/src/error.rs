//! Error types for settings loading.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading settings.
///
/// Telemetry key lookup never produces these; it degrades to the sentinel.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read a settings file.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings file is not valid JSON for the settings schema.
    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Settings parsed but failed validation.
    #[error("invalid settings: {0}")]
    Invalid(String),
}
