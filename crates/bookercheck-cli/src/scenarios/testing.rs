//! Mock booking service for running scenarios in tests

use std::sync::{Arc, Mutex};

use mockito::{Matcher, Mock, Request, Server, ServerGuard};
use serde_json::{Value, json};

use bookercheck_client::{ApiClient, BookerApi};
use bookercheck_core::{Config, FindingLog, SuiteReport};

use crate::runner::SuiteRunner;

use super::{Scenario, all};

/// A mockito server that remembers the last booking it accepted.
pub struct MockBooker {
    pub server: ServerGuard,
    id: u64,
    stored: Arc<Mutex<Value>>,
}

impl MockBooker {
    pub fn new() -> Self {
        Self::with_booking_id(1)
    }

    /// Every accepted booking gets `id`.
    pub fn with_booking_id(id: u64) -> Self {
        Self {
            server: Server::new(),
            id,
            stored: Arc::new(Mutex::new(Value::Null)),
        }
    }

    pub fn booking_path(&self) -> String {
        format!("/booking/{}", self.id)
    }

    /// `POST /booking` stores the request body after `edit` and answers 200
    /// with it as the created booking.
    pub fn accept_creates(&mut self, edit: fn(&mut Value)) -> Mock {
        let id = self.id;
        let stored = Arc::clone(&self.stored);
        self.server
            .mock("POST", "/booking")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body_from_request(move |req| {
                let mut booking = request_json(req);
                edit(&mut booking);
                *stored.lock().unwrap() = booking.clone();
                json!({"bookingid": id, "booking": booking})
                    .to_string()
                    .into_bytes()
            })
            .create()
    }

    pub fn reject_creates(&mut self, status: usize) -> Mock {
        self.server
            .mock("POST", "/booking")
            .with_status(status)
            .with_body("Bad Request")
            .create()
    }

    /// `GET /booking/{id}` answers with the stored booking.
    pub fn serve_stored(&mut self) -> Mock {
        let stored = Arc::clone(&self.stored);
        let path = self.booking_path();
        self.server
            .mock("GET", path.as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body_from_request(move |_| stored.lock().unwrap().to_string().into_bytes())
            .create()
    }

    /// `PATCH /booking/{id}` merges the request into the stored booking,
    /// applies `edit` and answers with the result.
    pub fn accept_patches(&mut self, edit: fn(&mut Value)) -> Mock {
        let stored = Arc::clone(&self.stored);
        let path = self.booking_path();
        self.server
            .mock("PATCH", path.as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body_from_request(move |req| {
                let mut booking = stored.lock().unwrap();
                if let (Some(fields), Value::Object(update)) =
                    (booking.as_object_mut(), request_json(req))
                {
                    fields.extend(update);
                }
                edit(&mut booking);
                booking.to_string().into_bytes()
            })
            .create()
    }

    /// `POST /auth` issues a token to anyone.
    pub fn issue_tokens(&mut self) -> Mock {
        self.server
            .mock("POST", "/auth")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"token":"abc123"}"#)
            .create()
    }

    /// Any `GET /booking/<n>` answers `status`.
    pub fn any_booking(&mut self, status: usize) -> Mock {
        self.server
            .mock("GET", Matcher::Regex(r"^/booking/\d+$".to_string()))
            .with_status(status)
            .with_body("Not Found")
            .create()
    }

    /// Run the scenarios with these ids, in catalogue order.
    pub fn run(&self, ids: &[&str]) -> (SuiteReport, FindingLog) {
        let api = BookerApi::new(ApiClient::new(self.server.url()).unwrap());
        let config = Config {
            base_url: self.server.url(),
            ..Config::default()
        };
        let picked: Vec<Scenario> = all().into_iter().filter(|s| ids.contains(&s.id)).collect();
        assert_eq!(picked.len(), ids.len(), "unknown id in {ids:?}");

        let log = FindingLog::new();
        let report = SuiteRunner::new(&api, &config, log.clone())
            .with_seed(Some(1))
            .run(&picked, true);
        (report, log)
    }
}

fn request_json(req: &Request) -> Value {
    req.body()
        .ok()
        .and_then(|body| serde_json::from_slice(body).ok())
        .unwrap_or(Value::Null)
}
