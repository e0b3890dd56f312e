//! Extension telemetry configuration.
//!
//! This crate provides:
//! - Telemetry key resolution with a sentinel fallback
//! - Environment collaborators (extension path, username, file reads)
//! - Settings loading and resolution (CLI → env → XDG → defaults)

pub mod env;
pub mod error;
pub mod key;
pub mod resolve;
pub mod settings;

pub use env::{Environment, FileReader, FsReader, StaticEnvironment, SystemEnvironment};
pub use error::{ConfigError, Result};
pub use key::{
    read_telemetry_key, resolve_key_file_path, telemetry_key_id, KeyEncoding, TelemetryKey,
    INVALID_TELEMETRY_KEY,
};
pub use resolve::{load_settings, resolve_settings, LoadedSettings, SettingsSource};
pub use settings::Settings;
