//! Error types for et-core commands.

use crate::exit_codes::ExitCode;
use et_config::ConfigError;
use thiserror::Error;

/// Result type alias for et-core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors surfaced by CLI commands.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Settings could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The exception log could not be read.
    #[error("failed to read input {name}: {source}")]
    Input {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// stdout could not be written.
    #[error("failed to write output: {0}")]
    Output(#[source] std::io::Error),

    /// A payload could not be serialized.
    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CoreError {
    /// Exit code reported for this error.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CoreError::Config(_) => ExitCode::ConfigError,
            CoreError::Input { .. } | CoreError::Output(_) => ExitCode::IoError,
            CoreError::Serialize(_) => ExitCode::InternalError,
        }
    }
}
