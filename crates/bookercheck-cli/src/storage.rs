//! Persistent report storage - `<output_dir>/reports/`
//!
//! Every `bookercheck run` is saved regardless of `--output` mode unless
//! `--no-save` is given. Directory layout: `{host_port}_{timestamp}/`

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use bookercheck_core::{Config, Finding, SuiteReport};

/// Everything needed to persist a run.
pub struct ReportData<'a> {
    pub config: &'a Config,
    pub report: &'a SuiteReport,
    pub findings: &'a [Finding],
}

/// Save a run under `output_dir/reports/{host_port}_{timestamp}/`.
///
/// Returns the report directory path on success.
pub fn save_report(output_dir: &Path, data: &ReportData) -> Result<PathBuf, std::io::Error> {
    save_report_at(output_dir, data, Utc::now())
}

fn save_report_at(
    output_dir: &Path,
    data: &ReportData,
    now: DateTime<Utc>,
) -> Result<PathBuf, std::io::Error> {
    let report_dir = output_dir
        .join("reports")
        .join(build_dir_name(&data.config.base_url, now));
    std::fs::create_dir_all(&report_dir)?;

    // config.toml, secrets masked
    let config_toml = toml::to_string_pretty(&data.config.redacted())
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    std::fs::write(report_dir.join("config.toml"), config_toml)?;

    let report = data.report;
    let summary = serde_json::json!({
        "verdict": report.verdict,
        "stats": {
            "scenarios": report.outcomes.len(),
            "passed": report.passed(),
            "failed": report.failed(),
            "findings": report.findings.total,
            "critical": report.findings.critical,
            "warnings": report.findings.warnings,
            "info": report.findings.info,
        },
        "meta": {
            "timestamp": now.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            "started_at": report.started_at,
            "duration_ms": report.duration_ms,
            "base_url": report.base_url,
        },
        "outcomes": report.outcomes,
    });
    std::fs::write(report_dir.join("summary.json"), to_json(&summary)?)?;

    if !data.findings.is_empty() {
        std::fs::write(report_dir.join("findings.json"), to_json(data.findings)?)?;
    }

    Ok(report_dir)
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, std::io::Error> {
    serde_json::to_string_pretty(value).map_err(std::io::Error::other)
}

/// `{host_port}_{timestamp}` e.g. `localhost_8080_20260205T193000`
fn build_dir_name(base_url: &str, now: DateTime<Utc>) -> String {
    let host_port = extract_host_port(base_url);
    format!("{host_port}_{}", now.format("%Y%m%dT%H%M%S"))
}

/// `"http://localhost:8080/path"` → `"localhost_8080"`
fn extract_host_port(url: &str) -> String {
    let host = url
        .split("://")
        .nth(1)
        .unwrap_or(url)
        .split('/')
        .next()
        .unwrap_or_default()
        .replace(':', "_");
    if host.is_empty() {
        "unknown".to_string()
    } else {
        host
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookercheck_core::{FindingSummary, Severity, Verdict, VerdictStatus};
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 5, 19, 30, 0).unwrap()
    }

    fn report(findings: &[Finding]) -> SuiteReport {
        SuiteReport {
            base_url: "http://localhost:3001".into(),
            started_at: "2026-02-05T19:29:58.000Z".into(),
            duration_ms: 1234,
            outcomes: Vec::new(),
            findings: FindingSummary::from_findings(findings),
            verdict: Verdict {
                status: VerdictStatus::Pass,
                exit_code: 0,
                reason: "0/0 scenarios passed".into(),
            },
        }
    }

    #[test]
    fn extract_host_port_standard() {
        assert_eq!(extract_host_port("http://localhost:8080"), "localhost_8080");
        assert_eq!(
            extract_host_port("https://restful-booker.herokuapp.com"),
            "restful-booker.herokuapp.com"
        );
        assert_eq!(
            extract_host_port("http://10.0.0.1:3000/v1"),
            "10.0.0.1_3000"
        );
        assert_eq!(extract_host_port("http:///nothing"), "unknown");
    }

    #[test]
    fn dir_name_format() {
        assert_eq!(
            build_dir_name("http://localhost:8080", fixed_now()),
            "localhost_8080_20260205T193000"
        );
    }

    #[test]
    fn writes_summary_and_findings() {
        let dir = tempfile::tempdir().unwrap();
        let findings = vec![Finding::new(
            "TC-SEC-008",
            Severity::Critical,
            "No rate limiting detected",
            fixed_now(),
        )];
        let config = Config {
            base_url: "http://localhost:3001".into(),
            api_key: Some("super-secret".into()),
            ..Config::default()
        };
        let report = report(&findings);
        let data = ReportData {
            config: &config,
            report: &report,
            findings: &findings,
        };

        let path = save_report_at(dir.path(), &data, fixed_now()).unwrap();
        assert!(path.ends_with("reports/localhost_3001_20260205T193000"));

        let summary: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path.join("summary.json")).unwrap())
                .unwrap();
        assert_eq!(summary["verdict"]["status"], "pass");
        assert_eq!(summary["stats"]["critical"], 1);
        assert_eq!(summary["meta"]["timestamp"], "2026-02-05T19:30:00Z");

        let saved: Vec<Finding> =
            serde_json::from_str(&std::fs::read_to_string(path.join("findings.json")).unwrap())
                .unwrap();
        assert_eq!(saved, findings);

        let config_toml = std::fs::read_to_string(path.join("config.toml")).unwrap();
        assert!(!config_toml.contains("super-secret"));
    }

    #[test]
    fn no_findings_file_when_clean() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let report = report(&[]);
        let data = ReportData {
            config: &config,
            report: &report,
            findings: &[],
        };

        let path = save_report(dir.path(), &data).unwrap();
        assert!(path.join("summary.json").exists());
        assert!(!path.join("findings.json").exists());
    }
}
