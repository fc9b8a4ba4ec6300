//! Append-only finding log shared by the scenarios of one run

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Finding, FindingSink, Severity};

/// Context name used before any test has been entered.
pub const NO_TEST: &str = "(suite)";

#[derive(Default)]
struct Shared {
    /// Held across append and dispatch so sinks see log order
    dispatch: Mutex<()>,
    findings: Mutex<Vec<Finding>>,
    sinks: Mutex<Vec<Arc<dyn FindingSink>>>,
}

/// Handle to a finding log.
///
/// Clones share the same sequence and sinks. Each handle stamps findings with
/// its own test name, see [`FindingLog::with_context`]. All operations are
/// total: none of them can fail.
#[derive(Clone)]
pub struct FindingLog {
    shared: Arc<Shared>,
    context: Arc<str>,
}

impl Default for FindingLog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FindingLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FindingLog")
            .field("context", &self.context)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl FindingLog {
    /// Empty log with no sinks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            context: Arc::from(NO_TEST),
        }
    }

    /// Register a sink. It receives every finding logged from now on, by any handle.
    pub fn add_sink(&self, sink: Arc<dyn FindingSink>) {
        self.shared.sinks.lock().push(sink);
    }

    /// Builder form of [`FindingLog::add_sink`].
    #[must_use]
    pub fn with_sink(self, sink: Arc<dyn FindingSink>) -> Self {
        self.add_sink(sink);
        self
    }

    /// Handle on the same log that stamps findings with `test`.
    #[must_use]
    pub fn with_context(&self, test: &str) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            context: Arc::from(test),
        }
    }

    /// Test name this handle stamps on findings
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Append a finding and forward it to every sink.
    ///
    /// Sinks receive findings in log order. A sink may read the log but must
    /// not log to it.
    pub fn log(&self, severity: Severity, message: impl Into<String>) {
        let _order = self.shared.dispatch.lock();
        let finding = Finding::new(self.context.as_ref(), severity, message, Utc::now());
        self.shared.findings.lock().push(finding.clone());

        // Sinks run outside the findings lock so they may read the log.
        let sinks = self.shared.sinks.lock().clone();
        for sink in &sinks {
            sink.record(&finding);
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(Severity::Info, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.log(Severity::Warning, message);
    }

    pub fn critical(&self, message: impl Into<String>) {
        self.log(Severity::Critical, message);
    }

    /// Snapshot of all findings, in insertion order
    #[must_use]
    pub fn findings(&self) -> Vec<Finding> {
        self.shared.findings.lock().clone()
    }

    /// Snapshot of the findings with the given severity, in insertion order
    #[must_use]
    pub fn by_severity(&self, severity: Severity) -> Vec<Finding> {
        self.shared
            .findings
            .lock()
            .iter()
            .filter(|f| f.severity == severity)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.findings.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counts and per-severity details, taken from a single snapshot.
    #[must_use]
    pub fn summary(&self) -> FindingSummary {
        FindingSummary::from_findings(&self.findings())
    }

    /// Drop every finding. Sinks stay registered.
    pub fn clear(&self) {
        self.shared.findings.lock().clear();
    }
}

/// Aggregated view of a finding sequence.
///
/// `total == critical + warnings + info` always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FindingSummary {
    pub total: usize,
    pub critical: usize,
    pub warnings: usize,
    pub info: usize,
    pub details: FindingDetails,
}

/// Findings split by severity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FindingDetails {
    pub critical: Vec<Finding>,
    pub warnings: Vec<Finding>,
    pub info: Vec<Finding>,
}

impl FindingSummary {
    #[must_use]
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut details = FindingDetails::default();
        for f in findings {
            match f.severity {
                Severity::Critical => details.critical.push(f.clone()),
                Severity::Warning => details.warnings.push(f.clone()),
                Severity::Info => details.info.push(f.clone()),
            }
        }
        Self {
            total: findings.len(),
            critical: details.critical.len(),
            warnings: details.warnings.len(),
            info: details.info.len(),
            details,
        }
    }

    /// Highest severity present, if any
    #[must_use]
    pub fn max_severity(&self) -> Option<Severity> {
        if self.critical > 0 {
            Some(Severity::Critical)
        } else if self.warnings > 0 {
            Some(Severity::Warning)
        } else if self.info > 0 {
            Some(Severity::Info)
        } else {
            None
        }
    }
}
