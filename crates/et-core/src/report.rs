//! Exception reports.
//!
//! An [`ExceptionReport`] is the payload a telemetry sender attaches to an
//! exception event: the anonymized log plus the instrumentation key it should
//! be routed with. Building one never fails; an unusable key is carried as the
//! sentinel with `key_valid = false`.

use chrono::{DateTime, Utc};
use et_config::{telemetry_key_id, Environment, FileReader, Settings, TelemetryKey};
use et_redact::LogAnonymizer;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Anonymized exception log ready for a telemetry sender.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExceptionReport {
    /// Unique id, `rpt-<12 hex>`.
    pub report_id: String,

    pub created_at: DateTime<Utc>,

    /// Key the event is routed with, or the sentinel.
    pub instrumentation_key: TelemetryKey,

    pub key_valid: bool,

    /// The anonymized log.
    pub content: String,

    /// How many username occurrences were removed.
    pub redacted_occurrences: usize,
}

impl ExceptionReport {
    /// Anonymize `content` for `username` and attach `key`.
    pub fn build(
        content: &str,
        username: &str,
        key: TelemetryKey,
        anonymizer: &LogAnonymizer,
    ) -> Self {
        let anonymized = anonymizer.anonymize_detailed(content, username);
        Self {
            report_id: generate_report_id(),
            created_at: Utc::now(),
            key_valid: key.is_valid(),
            instrumentation_key: key,
            content: anonymized.output,
            redacted_occurrences: anonymized.occurrences,
        }
    }
}

/// Build a report using the host environment for the key and username.
pub fn prepare_exception_report<E, R>(
    env: &E,
    reader: &R,
    settings: &Settings,
    content: &str,
) -> ExceptionReport
where
    E: Environment + ?Sized,
    R: FileReader + ?Sized,
{
    let key = telemetry_key_id(env, reader, settings);
    let username = env.username();
    let report = ExceptionReport::build(content, &username, key, &settings.anonymizer());

    info!(
        report_id = %report.report_id,
        key_valid = report.key_valid,
        redacted = report.redacted_occurrences,
        "prepared exception report"
    );
    report
}

/// Generate a unique report id.
pub fn generate_report_id() -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!("rpt-{}", &uuid[..12])
}
