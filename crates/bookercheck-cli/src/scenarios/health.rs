//! Service liveness

use super::{Category, Scenario, ScenarioContext, ScenarioResult, expect};

pub(super) fn scenarios() -> Vec<Scenario> {
    vec![Scenario {
        id: "TC-001",
        name: "health check answers 201",
        category: Category::Health,
        run: ping,
    }]
}

fn ping(ctx: &mut ScenarioContext<'_>) -> ScenarioResult {
    let resp = ctx.api.ping()?;
    expect::status(&resp, 201)
}
