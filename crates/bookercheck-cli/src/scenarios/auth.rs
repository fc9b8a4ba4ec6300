//! Token issuing and write protection

use bookercheck_client::{Auth, Shape};
use bookercheck_core::{auth_credentials, data::wrong_credentials};

use super::{Category, Scenario, ScenarioContext, ScenarioResult, expect};

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            id: "TC-AUTH-001",
            name: "valid credentials issue a token",
            category: Category::Auth,
            run: valid_credentials,
        },
        Scenario {
            id: "TC-AUTH-002",
            name: "invalid credentials are refused",
            category: Category::Auth,
            run: invalid_credentials,
        },
        Scenario {
            id: "TC-AUTH-003",
            name: "update with token",
            category: Category::Auth,
            run: update_with_token,
        },
        Scenario {
            id: "TC-AUTH-004",
            name: "delete with token",
            category: Category::Auth,
            run: delete_with_token,
        },
        Scenario {
            id: "TC-AUTH-005",
            name: "update without token is forbidden",
            category: Category::Auth,
            run: update_without_token,
        },
        Scenario {
            id: "TC-AUTH-006",
            name: "delete without token is forbidden",
            category: Category::Auth,
            run: delete_without_token,
        },
        Scenario {
            id: "TC-AUTH-007",
            name: "update with basic auth",
            category: Category::Auth,
            run: update_with_basic_auth,
        },
    ]
}

fn valid_credentials(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let resp = ctx.api.create_token(&auth_credentials())?;
    expect::status(&resp, 200)?;
    expect::shape(&resp, Shape::Token)
}

/// The service answers 200 with a `reason` instead of an error status.
fn invalid_credentials(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let resp = ctx.api.create_token(&wrong_credentials())?;
    expect::status(&resp, 200)?;
    expect::shape(&resp, Shape::AuthRejected)
}

fn update_with_token(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let auth = ctx.admin_token()?;
    let created = ctx.create_booking()?;
    let replacement = ctx.booking();
    let resp = ctx
        .api
        .update_booking(created.bookingid, &replacement, &auth)?;
    expect::status(&resp, 200)
}

fn delete_with_token(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let auth = ctx.admin_token()?;
    let created = ctx.create_booking()?;
    let resp = ctx.api.delete_booking(created.bookingid, &auth)?;
    expect::status(&resp, 201)
}

fn update_without_token(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let created = ctx.create_booking()?;
    let replacement = ctx.booking();
    let resp = ctx
        .api
        .update_booking(created.bookingid, &replacement, &Auth::None)?;
    expect::status(&resp, 403)
}

fn delete_without_token(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let created = ctx.create_booking()?;
    let resp = ctx.api.delete_booking(created.bookingid, &Auth::None)?;
    expect::status(&resp, 403)?;

    // Still there
    let resp = ctx.api.get_booking(created.bookingid)?;
    expect::status(&resp, 200)
}

fn update_with_basic_auth(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let created = ctx.create_booking()?;
    let replacement = ctx.booking();
    let resp = ctx.api.update_booking(
        created.bookingid,
        &replacement,
        &Auth::Basic(auth_credentials()),
    )?;
    expect::status(&resp, 200)?;
    expect::shape(&resp, Shape::Booking)
}
