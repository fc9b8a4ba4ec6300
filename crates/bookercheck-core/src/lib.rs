//! bookercheck-core: Core types for booking API checks
//!
//! Run configuration, booking test data, the shared finding log with its
//! sinks, and the suite report format. No I/O beyond reading config files.

pub mod config;
pub mod data;
pub mod finding;
pub mod report;

pub use config::{Config, ConfigError};
pub use data::{Booking, BookingDates, Credentials, auth_credentials, generate_booking};
pub use finding::{
    AnnotationSink, ConsoleSink, Finding, FindingLog, FindingSink, FindingSummary, Severity,
};
pub use report::{OutcomeStatus, ScenarioOutcome, SuiteReport, Verdict, VerdictStatus};
