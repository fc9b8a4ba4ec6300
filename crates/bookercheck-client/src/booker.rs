//! Typed helpers for the booking service endpoints
//!
//! Thin layer over [`ApiClient`]: paths, auth headers and the few response
//! fields the checks need. Status handling stays with the caller.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use bookercheck_core::{Booking, Credentials};

use crate::client::{ApiClient, ClientError, RequestOptions};
use crate::response::ApiResponse;

/// How a write request authenticates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    None,
    /// `Cookie: token=<token>`
    Token(String),
    /// `Authorization: Basic <base64(user:pass)>`
    Basic(Credentials),
}

impl Auth {
    /// Headers to send for this auth mode
    #[must_use]
    pub fn options(&self) -> RequestOptions {
        match self {
            Self::None => RequestOptions::new(),
            Self::Token(token) => RequestOptions::new().header("Cookie", token_cookie(token)),
            Self::Basic(creds) => {
                RequestOptions::new().header("Authorization", basic_auth(creds))
            }
        }
    }
}

/// `token=<token>`
#[must_use]
pub fn token_cookie(token: &str) -> String {
    format!("token={token}")
}

/// `Basic <base64(username:password)>`
#[must_use]
pub fn basic_auth(creds: &Credentials) -> String {
    let raw = format!("{}:{}", creds.username, creds.password);
    format!("Basic {}", STANDARD.encode(raw))
}

/// Body of a successful `POST /booking`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedBooking {
    pub bookingid: u64,
    pub booking: Booking,
}

/// One entry of `GET /booking`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingId {
    pub bookingid: u64,
}

/// Query filters for `GET /booking`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingFilter {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub checkin: Option<String>,
    pub checkout: Option<String>,
}

impl BookingFilter {
    fn to_query(&self) -> BTreeMap<String, String> {
        [
            ("firstname", &self.firstname),
            ("lastname", &self.lastname),
            ("checkin", &self.checkin),
            ("checkout", &self.checkout),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.as_ref().map(|v| (k.to_string(), v.clone())))
        .collect()
    }
}

/// Booking service endpoints.
#[derive(Debug, Clone)]
pub struct BookerApi {
    client: ApiClient,
}

impl BookerApi {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Underlying client, for raw calls
    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// `GET /ping` (the service answers 201)
    pub fn ping(&self) -> Result<ApiResponse, ClientError> {
        self.client.get("/ping")
    }

    /// `POST /auth`. Bad credentials still answer 200, with a `reason` field.
    pub fn create_token(&self, creds: &Credentials) -> Result<ApiResponse, ClientError> {
        self.client.post("/auth", creds)
    }

    /// Token for `creds`, or `None` when the service refused them.
    pub fn token(&self, creds: &Credentials) -> Result<Option<String>, ClientError> {
        let resp = self.create_token(creds)?;
        Ok(resp
            .field("token")
            .and_then(|t| t.as_str())
            .filter(|t| !t.is_empty())
            .map(str::to_string))
    }

    pub fn list_bookings(&self, filter: &BookingFilter) -> Result<ApiResponse, ClientError> {
        let opts = RequestOptions {
            query: filter.to_query(),
            ..RequestOptions::default()
        };
        self.client.get_with("/booking", &opts)
    }

    pub fn create_booking<B: Serialize + ?Sized>(
        &self,
        booking: &B,
    ) -> Result<ApiResponse, ClientError> {
        self.client.post("/booking", booking)
    }

    /// `id` is anything displayable so malformed ids can be sent too.
    pub fn get_booking(&self, id: impl std::fmt::Display) -> Result<ApiResponse, ClientError> {
        self.client.get(&booking_path(id))
    }

    pub fn update_booking<B: Serialize + ?Sized>(
        &self,
        id: impl std::fmt::Display,
        booking: &B,
        auth: &Auth,
    ) -> Result<ApiResponse, ClientError> {
        self.client
            .put_with(&booking_path(id), booking, &auth.options())
    }

    pub fn patch_booking<B: Serialize + ?Sized>(
        &self,
        id: impl std::fmt::Display,
        patch: &B,
        auth: &Auth,
    ) -> Result<ApiResponse, ClientError> {
        self.client
            .patch_with(&booking_path(id), patch, &auth.options())
    }

    pub fn delete_booking(
        &self,
        id: impl std::fmt::Display,
        auth: &Auth,
    ) -> Result<ApiResponse, ClientError> {
        self.client.delete_with(&booking_path(id), &auth.options())
    }
}

fn booking_path(id: impl std::fmt::Display) -> String {
    format!("/booking/{id}")
}
