//! Exit codes for the et-core CLI.
//!
//! Exit code ranges:
//! - 0: Success
//! - 2: Invalid arguments (reported by clap)
//! - 10-19: User/environment errors (recoverable by user action)
//! - 20-29: Internal errors (bugs, should be reported)

/// Exit codes for et-core operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Clean = 0,

    /// Settings file missing, malformed or invalid
    ConfigError = 11,

    /// Input could not be read or output could not be written
    IoError = 12,

    /// Internal error
    InternalError = 20,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}
