//! Blocking HTTP client with per-call option merging
//!
//! One method call = one network request. Nothing is retried, and HTTP error
//! statuses come back as `Ok(ApiResponse)`; only failures to complete the
//! exchange are `Err`.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::Value;

use bookercheck_core::Config;

use crate::response::ApiResponse;

/// Body sent with a request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized as JSON with `Content-Type: application/json`
    Json(Value),
    /// Sent verbatim with the given content type
    Raw { content_type: String, text: String },
}

/// Per-call overrides, shallow-merged over the client defaults.
///
/// Headers replace default headers of the same name (case-insensitive).
/// `query` is appended to any query string already in the endpoint.
/// `body` takes precedence over a body passed to a write method.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub headers: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
    pub body: Option<RequestBody>,
}

impl RequestOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn json_body(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    #[must_use]
    pub fn raw_body(mut self, content_type: impl Into<String>, text: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Raw {
            content_type: content_type.into(),
            text: text.into(),
        });
        self
    }
}

/// Why a request could not be completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// DNS failure, connection refused or reset
    Connect,
    Timeout,
    /// Response started but the body could not be read
    Body,
    Other,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connect => write!(f, "connect"),
            Self::Timeout => write!(f, "timeout"),
            Self::Body => write!(f, "body"),
            Self::Other => write!(f, "transport"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP client build failed: {0}")]
    Build(String),
    #[error("{kind} error on {method} {url}: {message}")]
    Transport {
        kind: TransportKind,
        method: String,
        url: String,
        message: String,
    },
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Cannot serialize request body: {0}")]
    Serialize(String),
}

impl ClientError {
    /// Kind of transport failure, `None` for non-transport errors
    #[must_use]
    pub fn transport_kind(&self) -> Option<TransportKind> {
        match self {
            Self::Transport { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// HTTP client bound to one base URL.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::blocking::Client,
    base_url: String,
    default_headers: BTreeMap<String, String>,
}

impl ApiClient {
    /// Build a client from run configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the underlying HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        let mut default_headers = BTreeMap::from([(
            "Accept".to_string(),
            "application/json".to_string(),
        )]);
        if let Some(key) = &config.api_key {
            default_headers.insert("X-API-Key".to_string(), key.clone());
        }
        for (name, value) in &config.headers {
            merge_header(&mut default_headers, name, value);
        }

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            default_headers,
        })
    }

    /// Client with default configuration for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::from_config(&Config {
            base_url: base_url.into(),
            ..Config::default()
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn default_headers(&self) -> &BTreeMap<String, String> {
        &self.default_headers
    }

    /// Absolute URL for `endpoint`. Absolute endpoints are returned unchanged.
    #[must_use]
    pub fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    pub fn get(&self, endpoint: &str) -> Result<ApiResponse, ClientError> {
        self.send(Method::GET, endpoint, &RequestOptions::default())
    }

    pub fn get_with(
        &self,
        endpoint: &str,
        opts: &RequestOptions,
    ) -> Result<ApiResponse, ClientError> {
        self.send(Method::GET, endpoint, opts)
    }

    pub fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<ApiResponse, ClientError> {
        self.post_with(endpoint, body, &RequestOptions::default())
    }

    pub fn post_with<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        opts: &RequestOptions,
    ) -> Result<ApiResponse, ClientError> {
        self.send(Method::POST, endpoint, &with_body(body, opts)?)
    }

    pub fn put<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<ApiResponse, ClientError> {
        self.put_with(endpoint, body, &RequestOptions::default())
    }

    pub fn put_with<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        opts: &RequestOptions,
    ) -> Result<ApiResponse, ClientError> {
        self.send(Method::PUT, endpoint, &with_body(body, opts)?)
    }

    pub fn patch<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<ApiResponse, ClientError> {
        self.patch_with(endpoint, body, &RequestOptions::default())
    }

    pub fn patch_with<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        opts: &RequestOptions,
    ) -> Result<ApiResponse, ClientError> {
        self.send(Method::PATCH, endpoint, &with_body(body, opts)?)
    }

    pub fn delete(&self, endpoint: &str) -> Result<ApiResponse, ClientError> {
        self.send(Method::DELETE, endpoint, &RequestOptions::default())
    }

    pub fn delete_with(
        &self,
        endpoint: &str,
        opts: &RequestOptions,
    ) -> Result<ApiResponse, ClientError> {
        self.send(Method::DELETE, endpoint, opts)
    }

    /// Issue exactly one request.
    ///
    /// # Errors
    ///
    /// [`ClientError::Transport`] if the exchange could not be completed,
    /// [`ClientError::InvalidRequest`] for header names/values HTTP cannot carry.
    /// Any HTTP status, 4xx and 5xx included, is `Ok`.
    pub fn send(
        &self,
        method: Method,
        endpoint: &str,
        opts: &RequestOptions,
    ) -> Result<ApiResponse, ClientError> {
        let url = self.url_for(endpoint);
        let mut headers = self.default_headers.clone();
        for (name, value) in &opts.headers {
            merge_header(&mut headers, name, value);
        }

        let mut req = self
            .http
            .request(method.clone(), &url)
            .headers(to_header_map(&headers)?);
        if !opts.query.is_empty() {
            req = req.query(&opts.query);
        }
        match &opts.body {
            Some(RequestBody::Json(value)) => {
                req = req.json(value);
            }
            Some(RequestBody::Raw { content_type, text }) => {
                req = req
                    .header(reqwest::header::CONTENT_TYPE, content_type.as_str())
                    .body(text.clone());
            }
            None => {}
        }

        let started = Instant::now();
        let resp = req
            .send()
            .map_err(|e| transport_error(&method, &url, &e))?;
        let response = ApiResponse::read(resp, method.as_str(), &url, started)?;

        tracing::debug!(
            method = %method,
            url = %url,
            status = response.status,
            elapsed_ms = response.elapsed_ms(),
            "request completed"
        );
        Ok(response)
    }
}

/// Insert or replace a header, matching names case-insensitively.
fn merge_header(headers: &mut BTreeMap<String, String>, name: &str, value: &str) {
    headers.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
    headers.insert(name.to_string(), value.to_string());
}

fn to_header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, ClientError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ClientError::InvalidRequest(format!("header name {name:?}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| ClientError::InvalidRequest(format!("value of header {name}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

/// Options with the write-method body filled in, unless the options carry one.
fn with_body<B: Serialize + ?Sized>(
    body: &B,
    opts: &RequestOptions,
) -> Result<RequestOptions, ClientError> {
    let mut merged = opts.clone();
    if merged.body.is_none() {
        let value = serde_json::to_value(body).map_err(|e| ClientError::Serialize(e.to_string()))?;
        merged.body = Some(RequestBody::Json(value));
    }
    Ok(merged)
}

fn transport_error(method: &Method, url: &str, e: &reqwest::Error) -> ClientError {
    let kind = if e.is_timeout() {
        TransportKind::Timeout
    } else if e.is_connect() {
        TransportKind::Connect
    } else if e.is_body() || e.is_decode() {
        TransportKind::Body
    } else {
        TransportKind::Other
    };
    tracing::warn!(method = %method, url = %url, kind = %kind, "request failed: {e}");
    ClientError::Transport {
        kind,
        method: method.to_string(),
        url: url.to_string(),
        message: e.to_string(),
    }
}
