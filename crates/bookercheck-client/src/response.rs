//! Response normalization
//!
//! Every HTTP call ends up as an [`ApiResponse`], whatever the content type.
//! Status codes are data here: a 404 or 500 is a normal response.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::client::{ClientError, TransportKind};

/// Response body: decoded JSON, or the raw text when the response is not
/// JSON or does not parse.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Text(String),
}

impl Body {
    #[must_use]
    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json(_))
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            Self::Text(_) => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Json(_) => None,
        }
    }

    /// Field of a JSON object body
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_json().and_then(|v| v.get(key))
    }

    /// Deserialize the body into `T`. Text bodies are parsed as JSON first.
    ///
    /// # Errors
    ///
    /// Returns the serde error when the body does not have the shape of `T`
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match self {
            Self::Json(v) => serde_json::from_value(v.clone()),
            Self::Text(s) => serde_json::from_str(s),
        }
    }
}

impl std::fmt::Display for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for Body {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Json(v) => v.serialize(serializer),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Normalized outcome of one HTTP call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Body,
    /// Lowercased header names. Repeated headers are joined with ", ".
    pub headers: BTreeMap<String, String>,
    /// Time from sending the request to reading the whole body
    #[serde(skip)]
    pub elapsed: Duration,
}

impl ApiResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Header value, case-insensitive
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Shorthand for `self.body.get(key)`
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }

    /// Read a blocking response to the end and normalize it.
    pub(crate) fn read(
        resp: reqwest::blocking::Response,
        method: &str,
        url: &str,
        started: std::time::Instant,
    ) -> Result<Self, ClientError> {
        let status = resp.status().as_u16();
        let headers = collect_headers(resp.headers());
        let content_type = headers.get("content-type").cloned();

        let text = resp.text().map_err(|e| ClientError::Transport {
            kind: TransportKind::Body,
            method: method.to_string(),
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            status,
            body: normalize(content_type.as_deref(), text),
            headers,
            elapsed: started.elapsed(),
        })
    }
}

/// Turn raw response text into a [`Body`].
///
/// JSON content types are decoded; if decoding fails the exact text is kept.
/// Anything else is returned as text unconditionally. Never fails.
#[must_use]
pub fn normalize(content_type: Option<&str>, text: String) -> Body {
    if content_type.is_some_and(is_json_content_type) {
        match serde_json::from_str(&text) {
            Ok(value) => Body::Json(value),
            Err(_) => Body::Text(text),
        }
    } else {
        Body::Text(text)
    }
}

/// `application/json` or any `+json` media type. Parameters are ignored.
#[must_use]
pub fn is_json_content_type(content_type: &str) -> bool {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    media_type == "application/json" || media_type.ends_with("+json")
}

fn collect_headers(map: &reqwest::header::HeaderMap) -> BTreeMap<String, String> {
    let mut headers: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in map {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        headers
            .entry(name.as_str().to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    headers
}
