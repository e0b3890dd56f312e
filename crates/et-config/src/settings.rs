//! Settings file schema.

use crate::error::{ConfigError, Result};
use crate::key::{KeyEncoding, KEY_FILENAME, RESOURCES_DIR};
use et_redact::{LogAnonymizer, DEFAULT_MARKER};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Telemetry settings.
///
/// Every field has a default, so `{}` is a valid settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Key file location relative to the extension root.
    pub key_path: PathBuf,

    /// Encoding of the key file content.
    pub key_encoding: KeyEncoding,

    /// Marker substituted for the username in anonymized logs.
    pub marker: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            key_path: Path::new(RESOURCES_DIR).join(KEY_FILENAME),
            key_encoding: KeyEncoding::Plain,
            marker: DEFAULT_MARKER.to_string(),
        }
    }
}

impl Settings {
    /// Load and validate settings from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings =
            serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.key_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("key_path is empty".to_string()));
        }
        if self.key_path.has_root() {
            return Err(ConfigError::Invalid(format!(
                "key_path must be relative to the extension root: {}",
                self.key_path.display()
            )));
        }
        let escapes_root = self
            .key_path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)));
        if escapes_root {
            return Err(ConfigError::Invalid(format!(
                "key_path must stay inside the extension root: {}",
                self.key_path.display()
            )));
        }
        if self.marker.is_empty() {
            return Err(ConfigError::Invalid("marker is empty".to_string()));
        }
        Ok(())
    }

    /// Key file location under `extension_root`.
    pub fn key_file_path(&self, extension_root: &Path) -> PathBuf {
        extension_root.join(&self.key_path)
    }

    /// Anonymizer using the configured marker.
    pub fn anonymizer(&self) -> LogAnonymizer {
        LogAnonymizer::with_marker(self.marker.clone())
    }
}
