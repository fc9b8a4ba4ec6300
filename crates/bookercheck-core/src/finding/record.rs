//! A single recorded finding

use chrono::{DateTime, SecondsFormat, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Severity;

/// Timestamped, severity-tagged observation made while a test was running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Finding {
    /// Name of the test that logged the finding
    pub test: String,
    /// Severity level
    pub severity: Severity,
    /// Free-form description
    pub message: String,
    /// ISO-8601 UTC timestamp, millisecond precision
    pub timestamp: String,
}

impl Finding {
    /// Create a finding stamped with the given time.
    #[must_use]
    pub fn new(
        test: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            test: test.into(),
            severity,
            message: message.into(),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Plain-text line used for console output and attachments: `[SEVERITY] message`
    #[must_use]
    pub fn to_line(&self) -> String {
        format!("[{}] {}", self.severity, self.message)
    }
}
