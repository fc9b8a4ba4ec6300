//! bookercheck-client: HTTP access to the booking service under test

pub mod booker;
pub mod client;
pub mod fanout;
pub mod response;
pub mod shape;

pub use booker::{Auth, BookerApi, BookingFilter, BookingId, CreatedBooking};
pub use client::{ApiClient, ClientError, RequestBody, RequestOptions, TransportKind};
pub use fanout::fan_out;
pub use response::{ApiResponse, Body, normalize};
pub use shape::{Shape, check_shape};
