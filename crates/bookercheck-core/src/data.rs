//! Booking test data
//!
//! Random but schema-valid payloads for the booking service, plus a few
//! fixed malformed payloads for negative-path checks. Everything takes the
//! RNG explicitly so a run can be replayed from a seed.

use chrono::{Days, Local, NaiveDate};
use rand::Rng;
use rand::distributions::Alphanumeric;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const FIRST_NAMES: &[&str] = &["John", "Jane", "Bob", "Alice", "Charlie", "Diana"];
pub const LAST_NAMES: &[&str] = &["Smith", "Doe", "Johnson", "Williams", "Brown", "Davis"];
pub const ADDITIONAL_NEEDS: &[&str] = &["Breakfast", "Lunch", "Dinner", "Parking", "Wi-Fi"];

/// Generated prices fall in `PRICE_MIN..=PRICE_MAX`.
pub const PRICE_MIN: i64 = 50;
pub const PRICE_MAX: i64 = 549;

/// Check-in is at most this many days after today.
pub const CHECKIN_WINDOW_DAYS: u64 = 30;
/// Stay length in nights, inclusive range.
pub const STAY_NIGHTS: std::ops::RangeInclusive<u64> = 1..=14;

/// Booking payload as accepted and returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Booking {
    pub firstname: String,
    pub lastname: String,
    pub totalprice: i64,
    pub depositpaid: bool,
    pub bookingdates: BookingDates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additionalneeds: Option<String>,
}

/// Stay dates, serialized as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BookingDates {
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
}

/// Login payload for `POST /auth`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Booking {
    /// Random booking relative to the local date, using the thread RNG.
    #[must_use]
    pub fn random() -> Self {
        generate_booking(&mut rand::thread_rng(), Local::now().date_naive())
    }

    /// Number of nights between check-in and check-out
    #[must_use]
    pub fn nights(&self) -> i64 {
        (self.bookingdates.checkout - self.bookingdates.checkin).num_days()
    }
}

/// Random, valid booking.
///
/// Check-in lands within [`CHECKIN_WINDOW_DAYS`] of `today`, check-out is
/// 1 to 14 nights later, so `checkin < checkout` always holds.
pub fn generate_booking(rng: &mut impl Rng, today: NaiveDate) -> Booking {
    let checkin = add_days(today, rng.gen_range(0..CHECKIN_WINDOW_DAYS));
    let checkout = add_days(checkin, rng.gen_range(STAY_NIGHTS));

    Booking {
        firstname: pick(rng, FIRST_NAMES).to_string(),
        lastname: pick(rng, LAST_NAMES).to_string(),
        totalprice: rng.gen_range(PRICE_MIN..=PRICE_MAX),
        depositpaid: rng.gen_bool(0.5),
        bookingdates: BookingDates { checkin, checkout },
        additionalneeds: Some(pick(rng, ADDITIONAL_NEEDS).to_string()),
    }
}

/// The admin account accepted by the service. Constant.
#[must_use]
pub fn auth_credentials() -> Credentials {
    Credentials {
        username: "admin".to_string(),
        password: "password123".to_string(),
    }
}

/// Credentials the service must refuse.
#[must_use]
pub fn wrong_credentials() -> Credentials {
    Credentials {
        username: "wronguser".to_string(),
        password: "wrongpass".to_string(),
    }
}

/// Deliberately malformed booking: empty names, negative price, non-boolean
/// deposit flag, unparseable dates. Not representable as [`Booking`].
#[must_use]
pub fn invalid_booking() -> Value {
    json!({
        "firstname": "",
        "lastname": "",
        "totalprice": -100,
        "depositpaid": "invalid",
        "bookingdates": {
            "checkin": "invalid-date",
            "checkout": "invalid-date"
        }
    })
}

/// Body for `PATCH /booking/{id}`.
#[must_use]
pub fn partial_booking_update() -> Value {
    json!({
        "firstname": "Updated",
        "lastname": "Name"
    })
}

/// Alphanumeric string of exactly `len` characters.
pub fn random_string(rng: &mut impl Rng, len: usize) -> String {
    (0..len).map(|_| char::from(rng.sample(Alphanumeric))).collect()
}

/// `test_<8 alphanumerics>@example.com`
pub fn random_email(rng: &mut impl Rng) -> String {
    format!("test_{}@example.com", random_string(rng, 8))
}

fn pick<'a>(rng: &mut impl Rng, pool: &[&'a str]) -> &'a str {
    pool[rng.gen_range(0..pool.len())]
}

fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    // Only overflows near NaiveDate::MAX, which no real "today" is.
    date.checked_add_days(Days::new(days)).unwrap_or(date)
}
