//! Suite report - scenario outcomes, finding summary and verdict
//!
//! This is the interchange format written by `bookercheck run --output json`
//! and persisted next to each run.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::finding::{FindingSummary, Severity, TestAnnotations};

/// Result of one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScenarioOutcome {
    /// Scenario id, e.g. "TC-AUTH-002"
    pub id: String,
    pub name: String,
    pub category: String,
    pub status: OutcomeStatus,
    /// Assertion or transport error message when failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub duration_ms: u64,
    /// Findings logged while the scenario ran
    #[serde(default, skip_serializing_if = "TestAnnotations::is_empty")]
    pub annotations: TestAnnotations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Passed,
    Failed,
}

/// Overall pass/fail status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    Pass,
    Fail,
}

impl std::fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

/// Final verdict with exit code and reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Verdict {
    pub status: VerdictStatus,
    pub exit_code: i32,
    pub reason: String,
}

impl Verdict {
    /// PASS requires every scenario to pass. The exit code is the highest of
    /// 1 for a failed scenario and the exit code of the worst finding.
    #[must_use]
    pub fn decide(outcomes: &[ScenarioOutcome], findings: &FindingSummary, strict: bool) -> Self {
        let failed = outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Failed)
            .count();

        let finding_code = findings
            .max_severity()
            .map_or(0, |s| s.exit_code(strict));
        let scenario_code = i32::from(failed > 0);
        let exit_code = finding_code.max(scenario_code);

        let status = if failed == 0 && !outcomes.is_empty() {
            VerdictStatus::Pass
        } else {
            VerdictStatus::Fail
        };

        let reason = if outcomes.is_empty() {
            "No scenarios were run".to_string()
        } else {
            let mut parts = vec![format!(
                "{}/{} scenarios passed",
                outcomes.len() - failed,
                outcomes.len()
            )];
            if findings.total > 0 {
                parts.push(format!(
                    "{} findings ({} critical, {} warning, {} info)",
                    findings.total, findings.critical, findings.warnings, findings.info
                ));
            }
            parts.join(", ")
        };

        Self {
            status,
            exit_code,
            reason,
        }
    }
}

/// Everything a suite run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SuiteReport {
    pub base_url: String,
    /// ISO-8601 UTC start time
    pub started_at: String,
    pub duration_ms: u64,
    pub outcomes: Vec<ScenarioOutcome>,
    pub findings: FindingSummary,
    pub verdict: Verdict,
}

impl SuiteReport {
    #[must_use]
    pub fn passed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Passed)
            .count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    /// Human-readable summary for terminal output.
    #[must_use]
    pub fn to_terminal(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("{}: {}", self.verdict.status, self.verdict.reason));
        lines.push(format!("  Target: {}", self.base_url));
        lines.push(format!(
            "  Scenarios: {} total, {} passed, {} failed",
            self.outcomes.len(),
            self.passed(),
            self.failed()
        ));
        lines.push(format!("  Exit code: {}", self.verdict.exit_code));

        let failures: Vec<&ScenarioOutcome> = self
            .outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::Failed)
            .collect();
        if !failures.is_empty() {
            lines.push(String::new());
            lines.push(format!("Failed scenarios ({}):", failures.len()));
            for o in failures {
                lines.push(format!("  [{}] {}", o.id, o.name));
                if let Some(msg) = &o.message {
                    lines.push(format!("         {msg}"));
                }
            }
        }

        lines.push(String::new());
        lines.push("Findings summary:".to_string());
        lines.push(format!(
            "  Total: {} (critical {}, warning {}, info {})",
            self.findings.total, self.findings.critical, self.findings.warnings, self.findings.info
        ));
        let groups = [
            (Severity::Critical, &self.findings.details.critical),
            (Severity::Warning, &self.findings.details.warnings),
            (Severity::Info, &self.findings.details.info),
        ];
        for (severity, findings) in groups {
            for f in findings {
                lines.push(format!("  [{severity}] {}: {}", f.test, f.message));
            }
        }

        lines.join("\n")
    }
}

/// JSON Schema of [`SuiteReport`], pretty-printed.
pub fn generate_schema() -> String {
    let schema = schemars::schema_for!(SuiteReport);
    serde_json::to_string_pretty(&schema).expect("schema serialization should not fail")
}
