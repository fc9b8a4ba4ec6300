//! Malformed and hostile input
//!
//! The service accepts much of this. Acceptance is recorded as a finding
//! rather than failing the scenario, as long as the status is plausible.

use serde_json::{Value, json};

use bookercheck_core::data::invalid_booking;

use super::{Category, Scenario, ScenarioContext, ScenarioResult, expect, stored, with_fields};

const XSS_SCRIPT: &str = r#"<script>alert("XSS")</script>"#;
const XSS_IMG: &str = "<img src=x onerror=alert(1)>";
const SQL_INJECTION: &str = "'; DROP TABLE bookings; --";
const LONG_FIELD_CHARS: usize = 10_000;

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            id: "TC-ERR-001",
            name: "missing required fields",
            category: Category::Errors,
            run: missing_fields,
        },
        Scenario {
            id: "TC-ERR-002",
            name: "invalid data types",
            category: Category::Errors,
            run: invalid_types,
        },
        Scenario {
            id: "TC-ERR-003",
            name: "invalid booking id format",
            category: Category::Errors,
            run: invalid_id_format,
        },
        Scenario {
            id: "TC-ERR-004",
            name: "script payloads are not stored verbatim",
            category: Category::Errors,
            run: xss_payload,
        },
        Scenario {
            id: "TC-ERR-005",
            name: "SQL injection payload",
            category: Category::Errors,
            run: sql_injection,
        },
        Scenario {
            id: "TC-ERR-006",
            name: "very long field values",
            category: Category::Errors,
            run: long_fields,
        },
        Scenario {
            id: "TC-ERR-007",
            name: "impossible calendar dates",
            category: Category::Errors,
            run: invalid_dates,
        },
        Scenario {
            id: "TC-ERR-008",
            name: "negative price",
            category: Category::Errors,
            run: negative_price,
        },
        Scenario {
            id: "TC-ERR-009",
            name: "special characters in names",
            category: Category::Errors,
            run: special_characters,
        },
        Scenario {
            id: "TC-ERR-010",
            name: "checkout before checkin",
            category: Category::Errors,
            run: checkout_before_checkin,
        },
    ]
}

fn fixed_booking(overrides: Value) -> Value {
    let booking = json!({
        "firstname": "John",
        "lastname": "Doe",
        "totalprice": 100,
        "depositpaid": true,
        "bookingdates": {
            "checkin": "2024-01-01",
            "checkout": "2024-01-05"
        }
    });
    with_fields(booking, overrides)
}

fn missing_fields(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let resp = ctx.api.create_booking(&json!({"firstname": "John"}))?;
    expect::status_in(&resp, &[200, 400, 500])?;
    if resp.status == 200 {
        ctx.log.warning("Booking without required fields was accepted");
    }
    Ok(())
}

fn invalid_types(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let resp = ctx.api.create_booking(&invalid_booking())?;
    expect::status_in(&resp, &[200, 400, 500])?;
    if resp.status == 200 {
        ctx.log.warning("Booking with invalid field types was accepted");
    }
    Ok(())
}

fn invalid_id_format(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let resp = ctx.api.get_booking("invalid-id")?;
    expect::status_in(&resp, &[400, 404, 500])
}

fn xss_payload(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let payload = fixed_booking(json!({
        "firstname": XSS_SCRIPT,
        "lastname": "Test",
        "additionalneeds": XSS_IMG,
    }));
    let resp = ctx.api.create_booking(&payload)?;
    expect::status_in(&resp, &[200, 400])?;
    if resp.status == 400 {
        ctx.log.info("Script payload rejected with 400");
        return Ok(());
    }

    let mut stored_verbatim = Vec::new();
    let firstname = stored(&resp, "firstname").and_then(Value::as_str);
    let needs = stored(&resp, "additionalneeds").and_then(Value::as_str);
    if firstname.is_some_and(|v| v.contains("<script>")) {
        stored_verbatim.push("firstname");
    }
    if needs.is_some_and(|v| v.contains("<img")) {
        stored_verbatim.push("additionalneeds");
    }

    if stored_verbatim.is_empty() {
        ctx.log.info("Script payload was sanitized");
    } else {
        ctx.log.critical(format!(
            "XSS payload stored without sanitization in {}",
            stored_verbatim.join(", ")
        ));
    }
    Ok(())
}

fn sql_injection(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let payload = fixed_booking(json!({"firstname": SQL_INJECTION, "lastname": "Test"}));
    let resp = ctx.api.create_booking(&payload)?;
    expect::status_in(&resp, &[200, 400, 500])
}

fn long_fields(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let long = "A".repeat(LONG_FIELD_CHARS);
    let payload = fixed_booking(json!({"firstname": long, "additionalneeds": long}));
    let resp = ctx.api.create_booking(&payload)?;
    expect::status_in(&resp, &[200, 400, 413, 500])
}

fn invalid_dates(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let payload = fixed_booking(json!({
        "bookingdates": {"checkin": "2024-13-45", "checkout": "2024-00-00"}
    }));
    let resp = ctx.api.create_booking(&payload)?;
    expect::status_in(&resp, &[200, 400, 500])
}

fn special_characters(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let payload = fixed_booking(json!({
        "firstname": "Jöhn@#$%",
        "lastname": "Döé™",
        "additionalneeds": "Test émojis 🚀🎉",
    }));
    let resp = ctx.api.create_booking(&payload)?;
    expect::status_in(&resp, &[200, 400])
}

fn negative_price(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let resp = ctx
        .api
        .create_booking(&fixed_booking(json!({"totalprice": -100})))?;
    expect::status_in(&resp, &[200, 400, 500])?;
    if resp.status == 200 {
        ctx.log.warning("Negative total price was accepted");
    }
    Ok(())
}

fn checkout_before_checkin(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let payload = fixed_booking(json!({
        "bookingdates": {"checkin": "2024-12-31", "checkout": "2024-01-01"}
    }));
    let resp = ctx.api.create_booking(&payload)?;
    expect::status_in(&resp, &[200, 400, 500])?;
    if resp.status == 200 {
        ctx.log.warning("Checkout before checkin was accepted");
    }
    Ok(())
}
