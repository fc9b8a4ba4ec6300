//! End-to-end scenarios against the booking service
//!
//! A scenario is a plain function over a [`ScenarioContext`]. It fails with a
//! [`ScenarioError`] when an expectation does not hold; weaknesses that are
//! worth reporting but should not fail the run go to the finding log instead.

mod auth;
mod crud;
mod errors;
pub mod expect;
mod health;
mod performance;
mod security;
#[cfg(test)]
mod testing;

use chrono::NaiveDate;
use clap::ValueEnum;
use rand::rngs::SmallRng;
use serde_json::Value;
use thiserror::Error;

use bookercheck_client::{ApiResponse, Auth, BookerApi, ClientError, CreatedBooking, Shape};
use bookercheck_core::{Booking, Config, FindingLog, auth_credentials, generate_booking};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Category {
    Health,
    Crud,
    Auth,
    Errors,
    Security,
    Performance,
}

impl Category {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Crud => "crud",
            Self::Auth => "auth",
            Self::Errors => "errors",
            Self::Security => "security",
            Self::Performance => "performance",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("{0}")]
    Assertion(String),

    #[error(transparent)]
    Transport(#[from] ClientError),

    #[error("encode request: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type ScenarioResult = Result<(), ScenarioError>;

/// One named check.
#[derive(Clone, Copy)]
pub struct Scenario {
    pub id: &'static str,
    pub name: &'static str,
    pub category: Category,
    pub run: fn(&mut ScenarioContext<'_>) -> ScenarioResult,
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

/// What a scenario gets to work with.
pub struct ScenarioContext<'a> {
    pub api: &'a BookerApi,
    pub config: &'a Config,
    /// Scoped to the running scenario's id
    pub log: FindingLog,
    pub rng: SmallRng,
    pub today: NaiveDate,
}

impl ScenarioContext<'_> {
    /// Fresh random booking
    pub fn booking(&mut self) -> Booking {
        generate_booking(&mut self.rng, self.today)
    }

    /// Random booking as JSON, with the top-level keys of `overrides` replaced.
    pub fn booking_with(&mut self, overrides: Value) -> Result<Value, ScenarioError> {
        Ok(with_fields(serde_json::to_value(self.booking())?, overrides))
    }

    /// Create a random booking and return what the service stored.
    pub fn create_booking(&mut self) -> Result<CreatedBooking, ScenarioError> {
        let booking = self.booking();
        let resp = self.api.create_booking(&booking)?;
        expect::status(&resp, 200)?;
        expect::shape(&resp, Shape::CreatedBooking)?;
        expect::decode(&resp)
    }

    /// Token for the admin account, as write auth.
    pub fn admin_token(&self) -> Result<Auth, ScenarioError> {
        match self.api.token(&auth_credentials())? {
            Some(token) => Ok(Auth::Token(token)),
            None => Err(ScenarioError::Assertion(
                "admin credentials were refused".to_string(),
            )),
        }
    }
}

/// `base` with the top-level keys of `overrides` replaced or added.
pub fn with_fields(mut base: Value, overrides: Value) -> Value {
    if let (Some(fields), Value::Object(overrides)) = (base.as_object_mut(), overrides) {
        fields.extend(overrides);
    }
    base
}

/// `booking.<key>` in a create response.
pub fn stored<'r>(resp: &'r ApiResponse, key: &str) -> Option<&'r Value> {
    resp.field("booking").and_then(|b| b.get(key))
}

/// Every scenario, in run order.
pub fn all() -> Vec<Scenario> {
    [
        health::scenarios(),
        crud::scenarios(),
        auth::scenarios(),
        errors::scenarios(),
        security::scenarios(),
        performance::scenarios(),
    ]
    .concat()
}

/// Scenarios in any of `categories` (all when empty) whose id contains
/// `filter`, case-insensitively.
pub fn select(categories: &[Category], filter: Option<&str>) -> Vec<Scenario> {
    let filter = filter.map(str::to_ascii_lowercase);
    all()
        .into_iter()
        .filter(|s| categories.is_empty() || categories.contains(&s.category))
        .filter(|s| {
            filter
                .as_deref()
                .is_none_or(|f| s.id.to_ascii_lowercase().contains(f))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let all = all();
        let ids: HashSet<_> = all.iter().map(|s| s.id).collect();
        assert_eq!(ids.len(), all.len());
    }

    #[test]
    fn every_category_has_scenarios() {
        for category in Category::value_variants() {
            assert!(
                !select(&[*category], None).is_empty(),
                "no scenarios for {category}"
            );
        }
    }

    #[test]
    fn select_by_category() {
        let picked = select(&[Category::Auth, Category::Health], None);
        assert!(
            picked
                .iter()
                .all(|s| matches!(s.category, Category::Auth | Category::Health))
        );
        assert!(picked.iter().any(|s| s.id == "TC-001"));
        assert!(picked.iter().any(|s| s.id == "TC-AUTH-001"));
    }

    #[test]
    fn select_by_id_substring() {
        let picked = select(&[], Some("sec-00"));
        assert!(!picked.is_empty());
        assert!(picked.iter().all(|s| s.id.starts_with("TC-SEC-00")));

        assert!(select(&[Category::Health], Some("SEC")).is_empty());
    }

    #[test]
    fn every_catalogued_case_is_registered() {
        let ids: HashSet<_> = all().iter().map(|s| s.id).collect();
        let mut expected = vec!["TC-001".to_string()];
        expected.extend((2..=10).map(|n| format!("TC-{n:03}")));
        expected.extend((1..=7).map(|n| format!("TC-AUTH-{n:03}")));
        expected.extend((1..=10).map(|n| format!("TC-ERR-{n:03}")));
        expected.extend((1..=15).map(|n| format!("TC-SEC-{n:03}")));
        expected.extend((1..=2).map(|n| format!("TC-PERF-{n:03}")));

        for id in &expected {
            assert!(ids.contains(id.as_str()), "{id} is not registered");
        }
        assert_eq!(all().len(), expected.len());
    }

    #[test]
    fn overrides_replace_top_level_keys() {
        let base = serde_json::json!({"firstname": "John", "bookingdates": {"checkin": "2024-01-01"}});
        let merged = with_fields(base, serde_json::json!({"totalprice": -100, "firstname": "x"}));
        assert_eq!(merged["totalprice"], -100);
        assert_eq!(merged["firstname"], "x");
        assert_eq!(merged["bookingdates"]["checkin"], "2024-01-01");
    }

    #[test]
    fn all_keeps_category_order() {
        let order: Vec<Category> = all().iter().map(|s| s.category).collect();
        let mut sorted = order.clone();
        sorted.sort_by_key(|c| Category::value_variants().iter().position(|v| v == c));
        assert_eq!(order, sorted);
    }
}
