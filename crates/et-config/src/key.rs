//! Telemetry key lookup.
//!
//! The key ships as a resource file inside the extension. A missing, empty or
//! undecodable file is not an error: the lookup degrades to
//! [`INVALID_TELEMETRY_KEY`] so callers can recognise the key as unusable.

use crate::env::{Environment, FileReader};
use crate::settings::Settings;
use base64::Engine as _;
use et_redact::anonymize;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Sentinel meaning "no valid telemetry key".
pub const INVALID_TELEMETRY_KEY: &str = "INVALID_INSTRUMENTATION_KEY";

/// Directory under the extension root holding bundled resources.
pub const RESOURCES_DIR: &str = "resources";

/// Key file name inside [`RESOURCES_DIR`].
pub const KEY_FILENAME: &str = "TELEMETRY_KEY";

/// How the key is stored in the resource file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEncoding {
    /// The file content is the key.
    #[default]
    Plain,
    /// The file content is the base64-encoded key.
    Base64,
}

impl std::str::FromStr for KeyEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" | "text" => Ok(KeyEncoding::Plain),
            "base64" => Ok(KeyEncoding::Base64),
            _ => Err(format!("unknown key encoding: {}", s)),
        }
    }
}

impl std::fmt::Display for KeyEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyEncoding::Plain => write!(f, "plain"),
            KeyEncoding::Base64 => write!(f, "base64"),
        }
    }
}

/// A telemetry key, or the sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TelemetryKey(String);

impl TelemetryKey {
    /// Wrap a key value. Blank values become the sentinel.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            Self::invalid()
        } else {
            Self(value)
        }
    }

    /// The sentinel key.
    pub fn invalid() -> Self {
        Self(INVALID_TELEMETRY_KEY.to_string())
    }

    pub fn is_valid(&self) -> bool {
        self.0 != INVALID_TELEMETRY_KEY
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Default for TelemetryKey {
    fn default() -> Self {
        Self::invalid()
    }
}

impl std::fmt::Display for TelemetryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Default key file location under an extension root.
pub fn resolve_key_file_path(extension_root: &Path) -> PathBuf {
    extension_root.join(RESOURCES_DIR).join(KEY_FILENAME)
}

/// Read the key at `path`, falling back to the sentinel on any failure.
///
/// Failures are logged without the path; callers that know the account name
/// log it anonymized (see [`telemetry_key_id`]).
pub fn read_telemetry_key<R>(reader: &R, path: &Path, encoding: KeyEncoding) -> TelemetryKey
where
    R: FileReader + ?Sized,
{
    let content = match reader.read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!(kind = ?e.kind(), "telemetry key file unavailable");
            return TelemetryKey::invalid();
        }
    };

    let trimmed = content.trim();
    if trimmed.is_empty() {
        debug!("telemetry key file is empty");
        return TelemetryKey::invalid();
    }

    match encoding {
        KeyEncoding::Plain => TelemetryKey::new(trimmed),
        KeyEncoding::Base64 => match decode_base64(trimmed) {
            Some(decoded) => TelemetryKey::new(decoded.trim()),
            None => {
                debug!("telemetry key file is not valid base64 text");
                TelemetryKey::invalid()
            }
        },
    }
}

/// Resolve and read the key for the extension described by `env`.
pub fn telemetry_key_id<E, R>(env: &E, reader: &R, settings: &Settings) -> TelemetryKey
where
    E: Environment + ?Sized,
    R: FileReader + ?Sized,
{
    let path = settings.key_file_path(&env.extension_path());
    let key = read_telemetry_key(reader, &path, settings.key_encoding);
    let shown = anonymize(&path.display().to_string(), &env.username());
    debug!(path = %shown, valid = key.is_valid(), "resolved telemetry key");
    key
}

fn decode_base64(value: &str) -> Option<String> {
    let bytes = base64::engine::general_purpose::STANDARD.decode(value).ok()?;
    String::from_utf8(bytes).ok()
}
