//! Environment collaborators.
//!
//! Key lookup and anonymization never touch process state directly; they ask
//! an [`Environment`] for the extension path and username and a
//! [`FileReader`] for file contents.

use std::io;
use std::path::{Path, PathBuf};

/// Overrides the extension install directory.
pub const ENV_EXTENSION_DIR: &str = "ET_EXTENSION_DIR";

/// Overrides the detected account name.
pub const ENV_USERNAME: &str = "ET_USERNAME";

/// Source of host facts.
pub trait Environment {
    /// Directory the extension is installed in.
    fn extension_path(&self) -> PathBuf;

    /// Account name of the running process. Empty if it cannot be determined.
    fn username(&self) -> String;
}

/// Reads whole files as text.
pub trait FileReader {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Reads from the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl FileReader for FsReader {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Environment backed by the running process.
#[derive(Debug, Clone, Default)]
pub struct SystemEnvironment {
    extension_dir: Option<PathBuf>,
}

impl SystemEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the extension directory instead of discovering it.
    pub fn with_extension_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            extension_dir: Some(dir.into()),
        }
    }
}

impl Environment for SystemEnvironment {
    /// Resolution order:
    /// 1. Explicit directory
    /// 2. `ET_EXTENSION_DIR`
    /// 3. Directory containing the running executable
    /// 4. Current directory
    fn extension_path(&self) -> PathBuf {
        if let Some(dir) = &self.extension_dir {
            return dir.clone();
        }

        if let Some(dir) = std::env::var_os(ENV_EXTENSION_DIR) {
            if !dir.is_empty() {
                return PathBuf::from(dir);
            }
        }

        if let Ok(exe) = std::env::current_exe() {
            if let Some(parent) = exe.parent() {
                return parent.to_path_buf();
            }
        }

        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }

    fn username(&self) -> String {
        detect_username()
    }
}

/// Environment with fixed answers.
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment {
    pub extension_path: PathBuf,
    pub username: String,
}

impl StaticEnvironment {
    pub fn new(extension_path: impl Into<PathBuf>, username: impl Into<String>) -> Self {
        Self {
            extension_path: extension_path.into(),
            username: username.into(),
        }
    }
}

impl Environment for StaticEnvironment {
    fn extension_path(&self) -> PathBuf {
        self.extension_path.clone()
    }

    fn username(&self) -> String {
        self.username.clone()
    }
}

/// Detect the account name: `ET_USERNAME`, `USER`, `USERNAME`, then the last
/// component of the home directory.
fn detect_username() -> String {
    for var in [ENV_USERNAME, "USER", "USERNAME"] {
        if let Ok(value) = std::env::var(var) {
            let value = value.trim();
            if !value.is_empty() {
                return value.to_string();
            }
        }
    }

    dirs::home_dir()
        .as_deref()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
