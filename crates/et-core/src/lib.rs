//! Extension Telemetry Core Library
//!
//! This library provides:
//! - Exit codes for CLI operations
//! - Error types shared by the CLI
//! - Structured logging setup
//! - Exception report assembly
//!
//! The binary entry point is in `main.rs`.

pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod report;

pub use error::{CoreError, Result};
pub use exit_codes::ExitCode;
pub use report::{generate_report_id, prepare_exception_report, ExceptionReport};
