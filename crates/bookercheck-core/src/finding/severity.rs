//! Severity levels for findings
//!
//! Severity drives the exit code of a suite run, the same way a failed
//! scenario does.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Finding severity
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Observation worth recording, nothing wrong (exit 0)
    Info,
    /// Questionable behavior of the service (exit 0, or 1 if strict)
    Warning,
    /// Security or business-logic defect (exit 2)
    Critical,
}

impl Severity {
    /// All severities, lowest first
    pub const ALL: [Self; 3] = [Self::Info, Self::Warning, Self::Critical];

    /// Convert severity to exit code
    ///
    /// - strict=true: Warning becomes exit 1
    /// - strict=false: Warning is exit 0
    #[must_use]
    pub const fn exit_code(self, strict: bool) -> i32 {
        match self {
            Self::Info => 0,
            Self::Warning => {
                if strict {
                    1
                } else {
                    0
                }
            }
            Self::Critical => 2,
        }
    }

    /// Upper-case label, as serialized
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
        }
    }

    /// Annotation type attached to the current test, e.g. `critical-finding`
    #[must_use]
    pub const fn annotation_kind(self) -> &'static str {
        match self {
            Self::Info => "info-finding",
            Self::Warning => "warning-finding",
            Self::Critical => "critical-finding",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
