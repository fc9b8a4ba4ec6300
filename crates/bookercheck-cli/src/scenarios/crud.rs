//! Create, read, update and delete round trips

use serde_json::json;

use bookercheck_client::{Auth, BookingFilter, BookingId, CreatedBooking, Shape};
use bookercheck_core::{Booking, data::partial_booking_update};

use super::{Category, Scenario, ScenarioContext, ScenarioResult, expect};

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            id: "TC-002",
            name: "create booking",
            category: Category::Crud,
            run: create,
        },
        Scenario {
            id: "TC-003",
            name: "get booking by id",
            category: Category::Crud,
            run: get_by_id,
        },
        Scenario {
            id: "TC-004",
            name: "list booking ids",
            category: Category::Crud,
            run: list_ids,
        },
        Scenario {
            id: "TC-005",
            name: "filter bookings by name",
            category: Category::Crud,
            run: filter_by_name,
        },
        Scenario {
            id: "TC-006",
            name: "update booking with token",
            category: Category::Crud,
            run: update,
        },
        Scenario {
            id: "TC-007",
            name: "partially update booking with token",
            category: Category::Crud,
            run: partial_update,
        },
        Scenario {
            id: "TC-008",
            name: "delete booking with token",
            category: Category::Crud,
            run: delete,
        },
        Scenario {
            id: "TC-009",
            name: "unknown booking id is not found",
            category: Category::Crud,
            run: get_missing,
        },
        Scenario {
            id: "TC-010",
            name: "update without auth is forbidden",
            category: Category::Crud,
            run: update_without_auth,
        },
    ]
}

const MISSING_ID: u64 = 999_999_999;

fn same_guest(sent: &Booking, stored: &Booking) -> ScenarioResult {
    expect::that(
        sent.firstname == stored.firstname
            && sent.lastname == stored.lastname
            && sent.totalprice == stored.totalprice
            && sent.depositpaid == stored.depositpaid
            && sent.bookingdates == stored.bookingdates,
        || format!("stored booking {stored:?} differs from sent {sent:?}"),
    )
}

fn create(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let booking = ctx.booking();
    let resp = ctx.api.create_booking(&booking)?;
    expect::status(&resp, 200)?;
    expect::shape(&resp, Shape::CreatedBooking)?;
    let created: CreatedBooking = expect::decode(&resp)?;
    expect::that(created.bookingid > 0, || "bookingid must be positive".into())?;
    same_guest(&booking, &created.booking)
}

fn get_by_id(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let created = ctx.create_booking()?;
    let resp = ctx.api.get_booking(created.bookingid)?;
    expect::status(&resp, 200)?;
    expect::shape(&resp, Shape::Booking)?;
    let stored: Booking = expect::decode(&resp)?;
    same_guest(&created.booking, &stored)
}

fn list_ids(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let resp = ctx.api.list_bookings(&BookingFilter::default())?;
    expect::status(&resp, 200)?;
    expect::shape(&resp, Shape::BookingIds)?;
    let ids: Vec<BookingId> = expect::decode(&resp)?;
    expect::that(!ids.is_empty(), || "booking list is empty".into())
}

fn filter_by_name(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let created = ctx.create_booking()?;
    let filter = BookingFilter {
        firstname: Some(created.booking.firstname.clone()),
        lastname: Some(created.booking.lastname.clone()),
        ..BookingFilter::default()
    };
    let resp = ctx.api.list_bookings(&filter)?;
    expect::status(&resp, 200)?;
    expect::shape(&resp, Shape::BookingIds)?;
    let ids: Vec<BookingId> = expect::decode(&resp)?;
    expect::that(
        ids.iter().any(|b| b.bookingid == created.bookingid),
        || format!("booking {} not in filtered list", created.bookingid),
    )
}

fn update(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let auth = ctx.admin_token()?;
    let created = ctx.create_booking()?;
    let replacement = ctx.booking();

    let resp = ctx
        .api
        .update_booking(created.bookingid, &replacement, &auth)?;
    expect::status(&resp, 200)?;
    expect::shape(&resp, Shape::Booking)?;
    let stored: Booking = expect::decode(&resp)?;
    same_guest(&replacement, &stored)
}

fn partial_update(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let auth = ctx.admin_token()?;
    let created = ctx.create_booking()?;

    let resp = ctx
        .api
        .patch_booking(created.bookingid, &partial_booking_update(), &auth)?;
    expect::status(&resp, 200)?;
    expect::field_eq(&resp, "firstname", &json!("Updated"))?;
    expect::field_eq(&resp, "lastname", &json!("Name"))?;
    expect::field_eq(&resp, "totalprice", &json!(created.booking.totalprice))
}

fn delete(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let auth = ctx.admin_token()?;
    let created = ctx.create_booking()?;

    let resp = ctx.api.delete_booking(created.bookingid, &auth)?;
    expect::status(&resp, 201)?;

    let resp = ctx.api.get_booking(created.bookingid)?;
    expect::status(&resp, 404)
}

fn get_missing(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let resp = ctx.api.get_booking(MISSING_ID)?;
    expect::status(&resp, 404)
}

fn update_without_auth(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let created = ctx.create_booking()?;
    let replacement = ctx.booking();
    let resp = ctx
        .api
        .update_booking(created.bookingid, &replacement, &Auth::None)?;
    expect::status(&resp, 403)
}
