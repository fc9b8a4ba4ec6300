//! Run configuration for booking API checks

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variables that override file values.
pub const ENV_BASE_URL: &str = "API_BASE_URL";
pub const ENV_TIMEOUT: &str = "TIMEOUT";
pub const ENV_RETRIES: &str = "RETRIES";
pub const ENV_API_KEY: &str = "API_KEY";

/// Run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the booking service under test
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retry count reported for information only; requests are never retried
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Optional API key, sent as `X-API-Key`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Extra HTTP headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Acceptable response time for the performance checks, in milliseconds
    #[serde(default = "default_response_time_limit_ms")]
    pub response_time_limit_ms: u64,

    /// Number of concurrent requests fired by the rate limiting check
    #[serde(default = "default_rate_limit_burst")]
    pub rate_limit_burst: u32,
}

fn default_base_url() -> String {
    "https://restful-booker.herokuapp.com".to_string()
}

const fn default_timeout_ms() -> u64 {
    60_000
}

const fn default_retries() -> u32 {
    2
}

const fn default_response_time_limit_ms() -> u64 {
    5_000
}

const fn default_rate_limit_burst() -> u32 {
    50
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            retries: default_retries(),
            api_key: None,
            headers: HashMap::new(),
            response_time_limit_ms: default_response_time_limit_ms(),
            rate_limit_burst: default_rate_limit_burst(),
        }
    }
}

impl Config {
    /// Load config from file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
        }
    }

    /// Load from default location (.bookercheck.toml)
    pub fn load_default() -> Result<Self, ConfigError> {
        let candidates = [".bookercheck.toml", ".bookercheck.json", "bookercheck.toml"];

        for name in candidates {
            let path = Path::new(name);
            if path.exists() {
                return Self::load(path);
            }
        }

        // No config file, return default
        Ok(Self::default())
    }

    /// File (explicit or default location) first, then process environment.
    ///
    /// # Errors
    ///
    /// Returns error if the file is unreadable or an environment value is malformed
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(p) => Self::load(p)?,
            None => Self::load_default()?,
        };
        base.apply_env(|name| std::env::var(name).ok())
    }

    /// Override fields from environment variables, read through `lookup`.
    ///
    /// Empty values are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] when `TIMEOUT` or `RETRIES` is not a number
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_BASE_URL) {
            self.base_url = url;
        }
        if let Some(raw) = get(ENV_TIMEOUT) {
            self.timeout_ms = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Env(ENV_TIMEOUT.to_string(), raw.clone()))?;
        }
        if let Some(raw) = get(ENV_RETRIES) {
            self.retries = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Env(ENV_RETRIES.to_string(), raw.clone()))?;
        }
        if let Some(key) = get(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        Ok(self)
    }

    /// Copy safe to persist next to a report: secrets replaced by `***`.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut out = self.clone();
        if out.api_key.is_some() {
            out.api_key = Some("***".to_string());
        }
        for (name, value) in &mut out.headers {
            if is_sensitive_header(name) {
                *value = "***".to_string();
            }
        }
        out
    }

    /// Create example config file
    pub fn example() -> &'static str {
        r#"# bookercheck configuration

# Booking service under test (env: API_BASE_URL)
base_url = "https://restful-booker.herokuapp.com"

# Per-request timeout in milliseconds (env: TIMEOUT)
timeout_ms = 60000

# Informational only, requests are never retried (env: RETRIES)
retries = 2

# Optional API key sent as X-API-Key (env: API_KEY)
# api_key = "your-api-key"

# Acceptable response time for performance checks
response_time_limit_ms = 5000

# Concurrent requests fired by the rate limiting check
rate_limit_burst = 50

# Extra headers sent with every request
[headers]
# User-Agent = "bookercheck"
"#
    }
}

/// Headers whose values must not be written to disk.
const SENSITIVE_HEADERS: &[&str] = &[
    "authorization",
    "x-api-key",
    "x-auth-token",
    "cookie",
    "set-cookie",
    "proxy-authorization",
];

fn is_sensitive_header(name: &str) -> bool {
    SENSITIVE_HEADERS.contains(&name.to_ascii_lowercase().as_str())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid value for {0}: {1:?}")]
    Env(String, String),
}
