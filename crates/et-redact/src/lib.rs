//! Username anonymization for extension exception logs.
//!
//! Exception logs collected by the extension host embed absolute paths such as
//! `C:\Users\alice\.vscode\extensions\...` or `/home/alice/.vscode/...`. Before
//! such a log may be attached to a telemetry event, every occurrence of the
//! current account name has to be removed.
//!
//! # Guarantees
//!
//! - **Separator-agnostic**: matching is plain substring scanning, so `/` and
//!   `\` paths, drive-letter and root-slash prefixes are handled identically.
//! - **No leakage**: for a non-empty username the output never contains it.
//!   A username that the marker itself would re-form (`anon` inside
//!   `<anonymized>`) gets one of the fallback markers instead.
//! - **Identity on empty username**: nothing is redacted.
//! - **Idempotent**: anonymizing an anonymized log is a no-op.
//!
//! # Example
//!
//! ```
//! use et_redact::anonymize;
//!
//! let log = "\tat activate (/home/alice/.vscode/extension.js:46:12)";
//! let out = anonymize(log, "alice");
//! assert_eq!(out, "\tat activate (/home/<anonymized>/.vscode/extension.js:46:12)");
//! ```

pub mod anonymize;

pub use anonymize::{anonymize, Anonymized, LogAnonymizer, DEFAULT_MARKER, FALLBACK_MARKERS};
