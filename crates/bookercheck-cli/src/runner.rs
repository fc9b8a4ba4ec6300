//! Sequential scenario runner
//!
//! Scenarios run one after another; concurrency lives inside the scenarios
//! that need it. Findings go to the shared [`FindingLog`]; per-scenario
//! annotations are drained right after each scenario so they land in its
//! outcome.

use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, NaiveDate, SecondsFormat, Utc};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use bookercheck_client::BookerApi;
use bookercheck_core::{
    AnnotationSink, Config, FindingLog, OutcomeStatus, ScenarioOutcome, SuiteReport, Verdict,
};

use crate::scenarios::{Scenario, ScenarioContext};

pub struct SuiteRunner<'a> {
    api: &'a BookerApi,
    config: &'a Config,
    log: FindingLog,
    annotations: Arc<AnnotationSink>,
    seed: Option<u64>,
    today: NaiveDate,
    progress: bool,
}

impl<'a> SuiteRunner<'a> {
    /// Registers an [`AnnotationSink`] on `log`.
    pub fn new(api: &'a BookerApi, config: &'a Config, log: FindingLog) -> Self {
        let annotations = Arc::new(AnnotationSink::new());
        log.add_sink(annotations.clone());
        Self {
            api,
            config,
            log,
            annotations,
            seed: None,
            today: Local::now().date_naive(),
            progress: false,
        }
    }

    /// Scenario `i` gets an RNG seeded with `seed + i`.
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Print one line per scenario (and its findings) to stderr.
    #[must_use]
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn run(&self, scenarios: &[Scenario], strict: bool) -> SuiteReport {
        let started_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let start = Instant::now();

        if self.progress {
            eprintln!(
                "Running {} scenarios against {}...",
                scenarios.len(),
                self.config.base_url
            );
        }

        let outcomes: Vec<ScenarioOutcome> = scenarios
            .iter()
            .enumerate()
            .map(|(index, scenario)| self.run_one(index, scenario))
            .collect();

        let findings = self.log.summary();
        let verdict = Verdict::decide(&outcomes, &findings, strict);

        SuiteReport {
            base_url: self.config.base_url.clone(),
            started_at,
            duration_ms: elapsed_ms(start),
            outcomes,
            findings,
            verdict,
        }
    }

    fn rng_for(&self, index: usize) -> SmallRng {
        match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(index as u64)),
            None => SmallRng::from_entropy(),
        }
    }

    fn run_one(&self, index: usize, scenario: &Scenario) -> ScenarioOutcome {
        let _span = tracing::info_span!("scenario", id = scenario.id).entered();
        let mut ctx = ScenarioContext {
            api: self.api,
            config: self.config,
            log: self.log.with_context(scenario.id),
            rng: self.rng_for(index),
            today: self.today,
        };

        let start = Instant::now();
        let result = (scenario.run)(&mut ctx);
        let duration_ms = elapsed_ms(start);
        let annotations = self.annotations.drain_test(scenario.id);

        let (status, message) = match result {
            Ok(()) => (OutcomeStatus::Passed, None),
            Err(e) => {
                tracing::debug!(error = %e, "scenario failed");
                (OutcomeStatus::Failed, Some(e.to_string()))
            }
        };

        if self.progress {
            let label = match status {
                OutcomeStatus::Passed => "PASS",
                OutcomeStatus::Failed => "FAIL",
            };
            eprintln!(
                "  {label} {} {} ({duration_ms} ms)",
                scenario.id, scenario.name
            );
            if let Some(message) = &message {
                eprintln!("       {message}");
            }
            for attachment in &annotations.attachments {
                eprintln!("       {}", attachment.body);
            }
        }

        ScenarioOutcome {
            id: scenario.id.to_string(),
            name: scenario.name.to_string(),
            category: scenario.category.to_string(),
            status,
            message,
            duration_ms,
            annotations,
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
