//! Security posture checks
//!
//! Most of these report findings instead of failing: a public demo service is
//! expected to miss some hardening, and the run should say so without
//! stopping.

use std::thread;
use std::time::Duration;

use serde_json::{Value, json};

use bookercheck_client::{ApiResponse, ClientError, RequestOptions};
use bookercheck_core::auth_credentials;

use super::{
    Category, Scenario, ScenarioContext, ScenarioError, ScenarioResult, expect, stored,
};

const SECURITY_HEADERS: [&str; 4] = [
    "x-content-type-options",
    "x-frame-options",
    "strict-transport-security",
    "content-security-policy",
];

/// Words that hint at internals leaking into an error body.
const LEAK_MARKERS: [&str; 4] = ["database", "query", "stack", "exception"];

const FOREIGN_ORIGIN: &str = "https://evil-site.com";

const COMMAND_INJECTION: [&str; 6] = [
    "; ls -la",
    "| whoami",
    "`cat /etc/passwd`",
    "$(rm -rf /)",
    "&& dir",
    "|| ping -c 10 127.0.0.1",
];

/// Fragments of `/etc/passwd` or a Windows path in a stored value.
const COMMAND_OUTPUT_MARKERS: [&str; 2] = ["root:", "C:\\"];

const PATH_TRAVERSAL: [&str; 4] = [
    "../../etc/passwd",
    r"..\..\windows\system32\config\sam",
    "../../../../../../../etc/hosts",
    "....//....//....//etc/passwd",
];

const LDAP_INJECTION: [&str; 4] = ["*", "*)(uid=*", "*(|(uid=*))", "admin)(&(password=*))"];

const PRIVILEGE_FIELDS: [&str; 3] = ["isAdmin", "role", "verified"];

const LARGE_PAYLOAD_BYTES: usize = 1024 * 1024;
const NEGATIVE_PRICE: i64 = -999_999;
const MAX_I32_PRICE: i64 = 2_147_483_647;

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            id: "TC-SEC-001",
            name: "tokens are unique per session",
            category: Category::Security,
            run: unique_tokens,
        },
        Scenario {
            id: "TC-SEC-002",
            name: "sequential id enumeration",
            category: Category::Security,
            run: id_enumeration,
        },
        Scenario {
            id: "TC-SEC-003",
            name: "command injection payloads",
            category: Category::Security,
            run: command_injection,
        },
        Scenario {
            id: "TC-SEC-004",
            name: "path traversal payloads",
            category: Category::Security,
            run: path_traversal,
        },
        Scenario {
            id: "TC-SEC-005",
            name: "LDAP injection payloads",
            category: Category::Security,
            run: ldap_injection,
        },
        Scenario {
            id: "TC-SEC-006",
            name: "privilege fields are not mass assigned",
            category: Category::Security,
            run: mass_assignment,
        },
        Scenario {
            id: "TC-SEC-007",
            name: "auth errors do not expose internals",
            category: Category::Security,
            run: no_sensitive_data_in_errors,
        },
        Scenario {
            id: "TC-SEC-008",
            name: "rate limiting",
            category: Category::Security,
            run: rate_limiting,
        },
        Scenario {
            id: "TC-SEC-009",
            name: "security headers",
            category: Category::Security,
            run: security_headers,
        },
        Scenario {
            id: "TC-SEC-010",
            name: "CORS policy",
            category: Category::Security,
            run: cors_policy,
        },
        Scenario {
            id: "TC-SEC-011",
            name: "oversized request body",
            category: Category::Security,
            run: large_payload,
        },
        Scenario {
            id: "TC-SEC-012",
            name: "negative price business rule",
            category: Category::Security,
            run: negative_price,
        },
        Scenario {
            id: "TC-SEC-013",
            name: "price at the 32-bit integer limit",
            category: Category::Security,
            run: integer_limit,
        },
        Scenario {
            id: "TC-SEC-014",
            name: "null bytes in names",
            category: Category::Security,
            run: null_bytes,
        },
        Scenario {
            id: "TC-SEC-015",
            name: "unicode names are preserved",
            category: Category::Security,
            run: unicode_names,
        },
    ]
}

/// Unwrap fan-out results, failing on the first transport error.
fn collect(
    results: Vec<Result<ApiResponse, ClientError>>,
) -> Result<Vec<ApiResponse>, ScenarioError> {
    results
        .into_iter()
        .map(|r| r.map_err(ScenarioError::from))
        .collect()
}

fn stored_text<'r>(resp: &'r ApiResponse, key: &str) -> &'r str {
    stored(resp, key).and_then(Value::as_str).unwrap_or_default()
}

/// Create a random booking with `overrides` and check the status is one of
/// `allowed`.
fn create_with(
    ctx: &mut ScenarioContext<'_>,
    overrides: Value,
    allowed: &[u16],
) -> Result<ApiResponse, ScenarioError> {
    let booking = ctx.booking_with(overrides)?;
    let resp = ctx.api.create_booking(&booking)?;
    expect::status_in(&resp, allowed)?;
    Ok(resp)
}

fn unique_tokens(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let creds = auth_credentials();
    let first = ctx.api.token(&creds)?;
    thread::sleep(Duration::from_millis(100));
    let second = ctx.api.token(&creds)?;

    let (Some(first), Some(second)) = (first, second) else {
        return Err(ScenarioError::Assertion(
            "admin credentials did not yield two tokens".to_string(),
        ));
    };
    if first == second {
        ctx.log
            .warning("Same token issued for two sessions, session fixation risk");
    }
    Ok(())
}

fn id_enumeration(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let created = ctx.create_booking()?;
    let id = created.bookingid;
    let neighbours: Vec<String> = [
        id.saturating_sub(1),
        id.saturating_add(1),
        id.saturating_add(2),
    ]
    .iter()
    .map(|n| format!("/booking/{n}"))
    .collect();

    let responses = collect(ctx.api.client().get_all(&neighbours))?;
    for resp in &responses {
        expect::status_in(resp, &[200, 404])?;
    }
    let readable = responses.iter().filter(|r| r.status == 200).count();
    if readable > 0 {
        ctx.log.info(format!(
            "{readable} neighbouring bookings readable without authentication"
        ));
    }
    Ok(())
}

fn command_injection(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    for payload in COMMAND_INJECTION {
        let resp = create_with(
            ctx,
            json!({"firstname": payload, "lastname": payload}),
            &[200, 400, 422],
        )?;
        if resp.status != 200 {
            continue;
        }

        let firstname = stored_text(&resp, "firstname");
        expect::that(
            !COMMAND_OUTPUT_MARKERS.iter().any(|m| firstname.contains(m)),
            || format!("command output in stored firstname: {firstname:?}"),
        )?;
        expect::that(firstname == payload, || {
            format!("payload {payload:?} stored as {firstname:?}")
        })?;
    }
    Ok(())
}

fn path_traversal(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    for payload in PATH_TRAVERSAL {
        create_with(ctx, json!({"additionalneeds": payload}), &[200, 400, 422])?;
    }
    Ok(())
}

fn ldap_injection(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    for payload in LDAP_INJECTION {
        create_with(ctx, json!({"firstname": payload}), &[200, 400, 422])?;
    }
    Ok(())
}

fn mass_assignment(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let resp = create_with(
        ctx,
        json!({"isAdmin": true, "role": "admin", "verified": true, "id": 1}),
        &[200, 400, 422],
    )?;
    if resp.status != 200 {
        return Ok(());
    }

    let assigned: Vec<&str> = PRIVILEGE_FIELDS
        .iter()
        .copied()
        .filter(|f| stored(&resp, f).is_some())
        .collect();
    expect::that(assigned.is_empty(), || {
        format!("privilege fields stored: {}", assigned.join(", "))
    })
}

fn no_sensitive_data_in_errors(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let creds = bookercheck_core::Credentials {
        username: "nonexistent".to_string(),
        password: "wrongpassword".to_string(),
    };
    let resp = ctx.api.create_token(&creds)?;
    expect::status(&resp, 200)?;
    expect::json(&resp)?;

    let body = resp.body.to_string().to_ascii_lowercase();
    let leaked: Vec<&str> = LEAK_MARKERS
        .iter()
        .copied()
        .filter(|m| body.contains(m))
        .collect();
    expect::that(leaked.is_empty(), || {
        format!("auth error mentions {}", leaked.join(", "))
    })
}

fn rate_limiting(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let burst = ctx.config.rate_limit_burst.max(1) as usize;
    let endpoints = vec!["/booking"; burst];
    let responses = collect(ctx.api.client().get_all(&endpoints))?;

    let limited = responses.iter().filter(|r| r.status == 429).count();
    if limited == 0 {
        ctx.log
            .critical("No rate limiting detected, API vulnerable to DoS attacks");
    } else {
        ctx.log.info(format!(
            "Rate limiting is implemented ({limited}/{burst} requests got 429)"
        ));
    }

    for resp in &responses {
        expect::status_in(resp, &[200, 429])?;
    }
    Ok(())
}

fn security_headers(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let resp = ctx.api.client().get("/booking")?;
    let missing: Vec<&str> = SECURITY_HEADERS
        .iter()
        .copied()
        .filter(|h| resp.header(h).is_none_or(str::is_empty))
        .collect();

    if missing.is_empty() {
        ctx.log.info("All recommended security headers are present");
    } else {
        ctx.log
            .warning(format!("Missing security headers: {}", missing.join(", ")));
    }
    expect::status(&resp, 200)
}

fn cors_policy(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let opts = RequestOptions::new().header("Origin", FOREIGN_ORIGIN);
    let resp = ctx.api.client().get_with("/booking", &opts)?;

    match resp.header("access-control-allow-origin") {
        Some("*") => ctx.log.warning(
            "CORS allows all origins (*) - verify this is intentional for a public API",
        ),
        Some(origin) => ctx.log.info(format!("CORS configured for: {origin}")),
        None => ctx.log.info("No CORS headers present"),
    }
    expect::status(&resp, 200)
}

fn large_payload(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let booking = ctx.booking_with(json!({"additionalneeds": "A".repeat(LARGE_PAYLOAD_BYTES)}))?;
    let resp = ctx.api.create_booking(&booking)?;

    if resp.status == 200 {
        ctx.log.warning(
            "API accepts 1MB payload - potential DoS vulnerability via memory exhaustion",
        );
    } else {
        ctx.log.info("API properly rejects oversized requests");
    }
    expect::status_in(&resp, &[200, 400, 413, 422])
}

fn negative_price(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let booking = ctx.booking_with(json!({"totalprice": NEGATIVE_PRICE}))?;
    let resp = ctx.api.create_booking(&booking)?;

    let stored_negative = stored(&resp, "totalprice")
        .and_then(Value::as_i64)
        .is_some_and(|p| p < 0);
    if resp.status == 200 && stored_negative {
        ctx.log
            .critical("API accepts negative prices - business logic vulnerability");
    } else {
        ctx.log.info("Negative prices are properly validated");
    }
    expect::status_in(&resp, &[200, 400, 422])
}

fn integer_limit(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let resp = create_with(ctx, json!({"totalprice": MAX_I32_PRICE}), &[200, 400, 422])?;
    if resp.status != 200 {
        return Ok(());
    }
    let price = stored(&resp, "totalprice").and_then(Value::as_i64);
    expect::that(price == Some(MAX_I32_PRICE), || {
        format!("totalprice {MAX_I32_PRICE} stored as {price:?}")
    })
}

fn null_bytes(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    create_with(
        ctx,
        json!({"firstname": "test\0.jpg", "lastname": "user\0admin"}),
        &[200, 400, 422],
    )?;
    Ok(())
}

fn unicode_names(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    const FIRSTNAME: &str = "🔥👍😀";
    const LASTNAME: &str = "中文测试";

    let resp = create_with(
        ctx,
        json!({"firstname": FIRSTNAME, "lastname": LASTNAME, "additionalneeds": "Ñoño café"}),
        &[200, 400],
    )?;
    if resp.status != 200 {
        return Ok(());
    }
    for (key, sent) in [("firstname", FIRSTNAME), ("lastname", LASTNAME)] {
        let kept = stored_text(&resp, key);
        expect::that(kept == sent, || format!("{key} {sent:?} stored as {kept:?}"))?;
    }
    Ok(())
}
