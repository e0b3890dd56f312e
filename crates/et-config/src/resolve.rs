//! Settings resolution and path discovery.
//!
//! Resolution order: CLI argument → environment variables → XDG paths → defaults.

use crate::error::Result;
use crate::settings::Settings;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where the settings came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SettingsSource {
    /// Explicitly provided via CLI argument.
    CliArgument,

    /// Set via environment variable.
    Environment,

    /// Found in XDG config directory.
    XdgConfig,

    /// Using built-in defaults.
    #[default]
    BuiltinDefault,
}

impl std::fmt::Display for SettingsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsSource::CliArgument => write!(f, "CLI argument"),
            SettingsSource::Environment => write!(f, "environment variable"),
            SettingsSource::XdgConfig => write!(f, "XDG config"),
            SettingsSource::BuiltinDefault => write!(f, "builtin default"),
        }
    }
}

/// Settings together with their origin.
#[derive(Debug, Clone, Default)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub source: SettingsSource,
    pub path: Option<PathBuf>,
}

/// Environment variable names.
pub const ENV_SETTINGS_PATH: &str = "ET_SETTINGS";
pub const ENV_CONFIG_DIR: &str = "ET_CONFIG_DIR";

/// Standard settings file name.
const SETTINGS_FILENAME: &str = "settings.json";

/// Application name for XDG directories.
const APP_NAME: &str = "ext-telemetry";

/// Locate the settings file.
///
/// 1. Explicit CLI path (used even if missing, so the load reports it)
/// 2. `ET_SETTINGS` (if the file exists)
/// 3. `ET_CONFIG_DIR` + `settings.json` (if the file exists)
/// 4. XDG config directory (`~/.config/ext-telemetry/settings.json`)
/// 5. Built-in defaults (None)
pub fn resolve_settings(cli_path: Option<&Path>) -> (Option<PathBuf>, SettingsSource) {
    if let Some(path) = cli_path {
        return (Some(path.to_path_buf()), SettingsSource::CliArgument);
    }

    if let Ok(env_path) = std::env::var(ENV_SETTINGS_PATH) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return (Some(path), SettingsSource::Environment);
        }
    }

    if let Ok(config_dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = PathBuf::from(config_dir).join(SETTINGS_FILENAME);
        if path.exists() {
            return (Some(path), SettingsSource::Environment);
        }
    }

    if let Some(xdg_config) = dirs::config_dir() {
        let path = xdg_config.join(APP_NAME).join(SETTINGS_FILENAME);
        if path.exists() {
            return (Some(path), SettingsSource::XdgConfig);
        }
    }

    (None, SettingsSource::BuiltinDefault)
}

/// Resolve and load settings.
pub fn load_settings(cli_path: Option<&Path>) -> Result<LoadedSettings> {
    let (path, source) = resolve_settings(cli_path);

    let settings = match &path {
        Some(p) => Settings::from_file(p)?,
        None => Settings::default(),
    };

    debug!(
        source = %source,
        path = ?path.as_ref().map(|p| p.display().to_string()),
        "loaded settings"
    );

    Ok(LoadedSettings {
        settings,
        source,
        path,
    })
}
