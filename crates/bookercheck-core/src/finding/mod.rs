//! Finding module - severity, records, the shared log and its sinks

mod log;
mod record;
mod severity;
mod sink;

pub use log::{FindingDetails, FindingLog, FindingSummary, NO_TEST};
pub use record::Finding;
pub use severity::Severity;
pub use sink::{
    Annotation, AnnotationSink, Attachment, ConsoleSink, FindingSink, TestAnnotations,
};
