//! The log anonymizer.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Marker substituted for each username occurrence.
pub const DEFAULT_MARKER: &str = "<anonymized>";

/// Markers tried, in order, when the configured one would re-form the username.
pub const FALLBACK_MARKERS: &[&str] = &["<user>", "<redacted>"];

/// Result of an anonymization pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anonymized {
    /// The anonymized text.
    pub output: String,

    /// Non-overlapping username occurrences found in the input.
    pub occurrences: usize,

    /// Whether the text was changed.
    pub was_modified: bool,
}

impl Anonymized {
    fn unchanged(text: &str) -> Self {
        Self {
            output: text.to_string(),
            occurrences: 0,
            was_modified: false,
        }
    }

    fn redacted(output: String, occurrences: usize) -> Self {
        Self {
            output,
            occurrences,
            was_modified: true,
        }
    }
}

/// Replaces every occurrence of a username in free text with a fixed marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogAnonymizer {
    marker: String,
}

impl LogAnonymizer {
    /// Create an anonymizer using [`DEFAULT_MARKER`].
    pub fn new() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
        }
    }

    /// Create an anonymizer with a custom marker.
    pub fn with_marker(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// The marker substituted for each occurrence.
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Anonymize `text`, returning only the output string.
    pub fn anonymize(&self, text: &str, username: &str) -> String {
        self.anonymize_detailed(text, username).output
    }

    /// Anonymize `text` and report what was done.
    ///
    /// Every literal occurrence of `username` is replaced, including ones that
    /// are only a prefix of a longer path segment (`alicefolder1`). If the
    /// configured marker would re-form the username, each of
    /// [`FALLBACK_MARKERS`] is tried in turn; only when all of them leak are
    /// occurrences deleted outright.
    pub fn anonymize_detailed(&self, text: &str, username: &str) -> Anonymized {
        if username.is_empty() {
            return Anonymized::unchanged(text);
        }

        let occurrences = text.matches(username).count();
        if occurrences == 0 {
            return Anonymized::unchanged(text);
        }

        let substitute = |marker: &str| {
            let replaced = text.replace(username, marker);
            (!replaced.contains(username)).then_some(replaced)
        };

        if let Some(replaced) = substitute(&self.marker) {
            return Anonymized::redacted(replaced, occurrences);
        }
        for &marker in FALLBACK_MARKERS.iter().filter(|m| **m != self.marker) {
            if let Some(replaced) = substitute(marker) {
                debug!(occurrences, marker, "configured marker re-formed the username");
                return Anonymized::redacted(replaced, occurrences);
            }
        }

        debug!(
            occurrences,
            "every marker re-formed the username, deleting occurrences instead"
        );
        Anonymized::redacted(strip_matches(text, username), occurrences)
    }
}

impl Default for LogAnonymizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Anonymize `text` with the default marker.
pub fn anonymize(text: &str, username: &str) -> String {
    LogAnonymizer::new().anonymize(text, username)
}

/// Delete `needle` from `text`, including occurrences formed by earlier
/// deletions, in one left-to-right pass.
///
/// The output buffer never contains `needle`: any new occurrence has to end at
/// the character just pushed, and it is cut off immediately.
fn strip_matches(text: &str, needle: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        out.push(c);
        if out.ends_with(needle) {
            out.truncate(out.len() - needle.len());
        }
    }
    out
}
