//! Response time and concurrent read checks

use bookercheck_client::BookingFilter;

use super::{Category, Scenario, ScenarioContext, ScenarioResult, expect};

const CONCURRENT_GETS: usize = 5;

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            id: "TC-PERF-001",
            name: "list responds within the time limit",
            category: Category::Performance,
            run: response_time,
        },
        Scenario {
            id: "TC-PERF-002",
            name: "concurrent reads all succeed",
            category: Category::Performance,
            run: concurrent_reads,
        },
    ]
}

fn response_time(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let resp = ctx.api.list_bookings(&BookingFilter::default())?;
    expect::status(&resp, 200)?;
    expect::within(&resp, ctx.config.response_time_limit_ms)
}

fn concurrent_reads(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let endpoints = ["/booking"; CONCURRENT_GETS];
    for result in ctx.api.client().get_all(&endpoints) {
        expect::status(&result?, 200)?;
    }
    Ok(())
}
