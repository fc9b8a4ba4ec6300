//! Finding sinks - where logged findings are forwarded
//!
//! The log itself only stores findings. Anything that wants to react to a
//! finding as it happens (console, report annotations) implements
//! [`FindingSink`] and is registered on the log.

use parking_lot::Mutex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Finding, Severity};

/// Receiver of findings at log time.
pub trait FindingSink: Send + Sync {
    /// Called once per finding, after it has been appended to the log.
    fn record(&self, finding: &Finding);
}

/// Plain-text console sink, emitting through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl FindingSink for ConsoleSink {
    fn record(&self, finding: &Finding) {
        match finding.severity {
            Severity::Info => {
                tracing::info!(test = %finding.test, "{}", finding.to_line());
            }
            Severity::Warning => {
                tracing::warn!(test = %finding.test, "{}", finding.to_line());
            }
            Severity::Critical => {
                tracing::error!(test = %finding.test, "{}", finding.to_line());
            }
        }
    }
}

/// Short labelled entry shown next to a test result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Annotation {
    /// e.g. `warning-finding`
    pub kind: String,
    pub description: String,
}

/// Text blob attached to a test result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Attachment {
    /// e.g. `CRITICAL Finding`
    pub name: String,
    pub content_type: String,
    pub body: String,
}

/// Annotations and attachments collected for one test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TestAnnotations {
    pub annotations: Vec<Annotation>,
    pub attachments: Vec<Attachment>,
}

impl TestAnnotations {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty() && self.attachments.is_empty()
    }
}

/// Collects per-test annotations/attachments until the reporter drains them.
#[derive(Debug, Default)]
pub struct AnnotationSink {
    entries: Mutex<Vec<(String, Annotation, Attachment)>>,
}

impl AnnotationSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything recorded for `test`, in recording order.
    pub fn drain_test(&self, test: &str) -> TestAnnotations {
        let mut entries = self.entries.lock();
        let mut out = TestAnnotations::default();
        entries.retain(|(name, annotation, attachment)| {
            if name == test {
                out.annotations.push(annotation.clone());
                out.attachments.push(attachment.clone());
                false
            } else {
                true
            }
        });
        out
    }

    /// Number of entries not yet drained
    #[must_use]
    pub fn pending(&self) -> usize {
        self.entries.lock().len()
    }
}

impl FindingSink for AnnotationSink {
    fn record(&self, finding: &Finding) {
        let annotation = Annotation {
            kind: finding.severity.annotation_kind().to_string(),
            description: finding.message.clone(),
        };
        let attachment = Attachment {
            name: format!("{} Finding", finding.severity),
            content_type: "text/plain".to_string(),
            body: finding.to_line(),
        };
        self.entries
            .lock()
            .push((finding.test.clone(), annotation, attachment));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn finding(test: &str, severity: Severity, message: &str) -> Finding {
        Finding::new(test, severity, message, Utc::now())
    }

    #[test]
    fn annotation_sink_records_kind_and_attachment() {
        let sink = AnnotationSink::new();
        sink.record(&finding("TC-1", Severity::Critical, "no rate limiting"));

        let drained = sink.drain_test("TC-1");
        assert_eq!(drained.annotations.len(), 1);
        assert_eq!(drained.annotations[0].kind, "critical-finding");
        assert_eq!(drained.annotations[0].description, "no rate limiting");
        assert_eq!(drained.attachments[0].name, "CRITICAL Finding");
        assert_eq!(drained.attachments[0].content_type, "text/plain");
        assert_eq!(drained.attachments[0].body, "[CRITICAL] no rate limiting");
    }

    #[test]
    fn drain_only_takes_matching_test() {
        let sink = AnnotationSink::new();
        sink.record(&finding("a", Severity::Info, "1"));
        sink.record(&finding("b", Severity::Warning, "2"));
        sink.record(&finding("a", Severity::Warning, "3"));

        let a = sink.drain_test("a");
        assert_eq!(
            a.annotations
                .iter()
                .map(|x| x.description.as_str())
                .collect::<Vec<_>>(),
            vec!["1", "3"]
        );
        assert_eq!(sink.pending(), 1);
        assert!(sink.drain_test("a").is_empty());
        assert_eq!(sink.drain_test("b").annotations.len(), 1);
    }

    #[test]
    fn console_sink_accepts_every_severity() {
        for severity in Severity::ALL {
            ConsoleSink.record(&finding("t", severity, "msg"));
        }
    }
}
