//! Structured logging for et-core.
//!
//! - stdout is reserved for command payloads (anonymized text, JSON)
//! - stderr receives all log output, human-readable or JSONL
//! - Events carry counts, paths and flags; never log content
//! - Account names are stripped from every line before it reaches stderr

pub mod config;
pub mod redact;

pub use config::{LogConfig, LogFormat, LogLevel};
pub use redact::{redact_usernames, RedactingStderr, RedactingWriter};

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Crates whose events are shown at the configured level.
const LOG_TARGETS: &[&str] = &["et_core", "et_config", "et_redact"];

/// Directive string for the configured level, e.g. `et_core=info,et_config=info,...`.
pub fn filter_directives(level: LogLevel) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the logging subsystem.
///
/// Must be called once at startup. `ET_LOG_FILTER` may supply a full
/// `EnvFilter` directive string that replaces the level-derived one.
/// Occurrences of any of `usernames` are anonymized in the emitted lines.
pub fn init_logging(config: &LogConfig, usernames: &[&str]) {
    let writer = RedactingStderr::new(usernames.iter().copied());
    let filter = EnvFilter::try_from_env("ET_LOG_FILTER")
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config.level)));

    match config.format {
        LogFormat::Human => {
            let fmt_layer = fmt::layer()
                .with_writer(writer)
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal());

            if config.timestamps {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer)
                    .init();
            } else {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt_layer.without_time())
                    .init();
            }
        }
        LogFormat::Jsonl => {
            let json_layer = fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .with_writer(writer);
            tracing_subscriber::registry()
                .with(filter)
                .with(json_layer)
                .init();
        }
    }
}
