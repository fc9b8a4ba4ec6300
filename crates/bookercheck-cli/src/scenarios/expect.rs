//! Assertions over normalized responses

use serde::de::DeserializeOwned;
use serde_json::Value;

use bookercheck_client::{ApiResponse, Shape, check_shape};

use super::{ScenarioError, ScenarioResult};

const BODY_PREVIEW: usize = 200;

fn fail(message: String) -> ScenarioResult {
    Err(ScenarioError::Assertion(message))
}

fn preview(resp: &ApiResponse) -> String {
    let text = resp.body.to_string();
    if text.chars().count() <= BODY_PREVIEW {
        text
    } else {
        let cut: String = text.chars().take(BODY_PREVIEW).collect();
        format!("{cut}...")
    }
}

pub fn status(resp: &ApiResponse, expected: u16) -> ScenarioResult {
    if resp.status == expected {
        Ok(())
    } else {
        fail(format!(
            "expected status {expected}, got {}: {}",
            resp.status,
            preview(resp)
        ))
    }
}

/// Status is one of `allowed`.
pub fn status_in(resp: &ApiResponse, allowed: &[u16]) -> ScenarioResult {
    if allowed.contains(&resp.status) {
        Ok(())
    } else {
        fail(format!(
            "expected status in {allowed:?}, got {}: {}",
            resp.status,
            preview(resp)
        ))
    }
}

pub fn shape(resp: &ApiResponse, shape: Shape) -> ScenarioResult {
    check_shape(shape, &resp.body).map_err(|errors| {
        ScenarioError::Assertion(format!("{shape:?} shape: {}", errors.join("; ")))
    })
}

pub fn json(resp: &ApiResponse) -> ScenarioResult {
    if resp.body.is_json() {
        Ok(())
    } else {
        fail(format!("expected a JSON body, got: {}", preview(resp)))
    }
}

/// Round trip no slower than `limit_ms`.
pub fn within(resp: &ApiResponse, limit_ms: u64) -> ScenarioResult {
    let took = resp.elapsed_ms();
    if took <= limit_ms {
        Ok(())
    } else {
        fail(format!("response took {took} ms, limit is {limit_ms} ms"))
    }
}

pub fn field_eq(resp: &ApiResponse, key: &str, expected: &Value) -> ScenarioResult {
    match resp.field(key) {
        Some(actual) if actual == expected => Ok(()),
        Some(actual) => fail(format!("field `{key}`: expected {expected}, got {actual}")),
        None => fail(format!("field `{key}` missing: {}", preview(resp))),
    }
}

pub fn decode<T: DeserializeOwned>(resp: &ApiResponse) -> Result<T, ScenarioError> {
    resp.body.decode().map_err(|e| {
        ScenarioError::Assertion(format!("unexpected body ({e}): {}", preview(resp)))
    })
}

pub fn that(condition: bool, message: impl FnOnce() -> String) -> ScenarioResult {
    if condition { Ok(()) } else { fail(message()) }
}
