//! Payload shape checks for booking service responses
//!
//! JSON Schemas for the response bodies the checks rely on. Only structure is
//! checked here; values are compared by the caller.

use serde_json::{Value, json};

use crate::response::Body;

/// Known response payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `GET /booking/{id}`, `PUT`/`PATCH` responses
    Booking,
    /// `POST /booking`
    CreatedBooking,
    /// `GET /booking`
    BookingIds,
    /// `POST /auth` with good credentials
    Token,
    /// `POST /auth` with bad credentials
    AuthRejected,
}

impl Shape {
    #[must_use]
    pub fn schema(self) -> Value {
        match self {
            Self::Booking => booking_schema(),
            Self::CreatedBooking => json!({
                "type": "object",
                "required": ["bookingid", "booking"],
                "properties": {
                    "bookingid": {"type": "integer", "minimum": 1},
                    "booking": booking_schema()
                }
            }),
            Self::BookingIds => json!({
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["bookingid"],
                    "properties": {"bookingid": {"type": "integer"}}
                }
            }),
            Self::Token => json!({
                "type": "object",
                "required": ["token"],
                "properties": {"token": {"type": "string", "minLength": 1}}
            }),
            Self::AuthRejected => json!({
                "type": "object",
                "required": ["reason"],
                "properties": {"reason": {"type": "string"}},
                "not": {"required": ["token"]}
            }),
        }
    }
}

fn booking_schema() -> Value {
    json!({
        "type": "object",
        "required": ["firstname", "lastname", "totalprice", "depositpaid", "bookingdates"],
        "properties": {
            "firstname": {"type": "string"},
            "lastname": {"type": "string"},
            "totalprice": {"type": "integer"},
            "depositpaid": {"type": "boolean"},
            "bookingdates": {
                "type": "object",
                "required": ["checkin", "checkout"],
                "properties": {
                    "checkin": {"type": "string"},
                    "checkout": {"type": "string"}
                }
            },
            "additionalneeds": {"type": "string"}
        }
    })
}

/// Validate `body` against `shape`.
///
/// # Errors
///
/// Up to five violation messages. A text body is always a violation.
pub fn check_shape(shape: Shape, body: &Body) -> Result<(), Vec<String>> {
    let Some(value) = body.as_json() else {
        return Err(vec![format!("expected JSON body, got text: {body}")]);
    };

    let schema = shape.schema();
    let validator = jsonschema::validator_for(&schema)
        .map_err(|e| vec![format!("invalid schema for {shape:?}: {e}")])?;

    let errors: Vec<String> = validator
        .iter_errors(value)
        .take(5)
        .map(|e| e.to_string())
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
