//! Client configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_SESSION_LIFETIME_DAYS: u64 = 7;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_STORAGE_PATH: &str = ".pegasus/storage.json";

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("missing required env var {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    /// Whole-request deadline; `0` leaves requests without one.
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin without a trailing slash, e.g. `https://api.example.com`.
    pub backend_url: String,
    /// Send and store session cookies. Fixed for the lifetime of the clients.
    pub with_credentials: bool,
    /// Lifetime stamped on the auth marker when the backend does not report one.
    pub session_lifetime_secs: u64,
    pub timeouts: HttpTimeouts,
    /// Where the file-backed storage keeps the auth marker and last route.
    pub storage_path: PathBuf,
}

impl ClientConfig {
    /// Config with defaults for everything except the backend address.
    #[must_use]
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into().trim_end_matches('/').to_owned(),
            with_credentials: true,
            session_lifetime_secs: DEFAULT_SESSION_LIFETIME_DAYS * SECS_PER_DAY,
            timeouts: HttpTimeouts::default(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
        }
    }

    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `PEGASUS_BACKEND_URL`
    ///
    /// Optional:
    /// - `PEGASUS_WITH_CREDENTIALS`: default `true`
    /// - `PEGASUS_SESSION_LIFETIME_DAYS`: default 7
    /// - `PEGASUS_REQUEST_TIMEOUT_SECS`: default 30, `0` disables
    /// - `PEGASUS_CONNECT_TIMEOUT_SECS`: default 10
    /// - `PEGASUS_STORAGE_PATH`: default `.pegasus/storage.json`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the backend URL is missing or any value
    /// fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend_url = std::env::var("PEGASUS_BACKEND_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("PEGASUS_BACKEND_URL"))?;
        let backend_url = parse_backend_url(&backend_url)?;

        let mut config = Self::new(backend_url);
        if let Ok(raw) = std::env::var("PEGASUS_WITH_CREDENTIALS") {
            config.with_credentials = parse_bool(&raw)
                .ok_or(ConfigError::Invalid { var: "PEGASUS_WITH_CREDENTIALS", value: raw })?;
        }
        let days = env_parse_u64("PEGASUS_SESSION_LIFETIME_DAYS", DEFAULT_SESSION_LIFETIME_DAYS)?;
        config.session_lifetime_secs = days.saturating_mul(SECS_PER_DAY);
        config.timeouts = HttpTimeouts {
            request_secs: env_parse_u64("PEGASUS_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?,
            connect_secs: env_parse_u64("PEGASUS_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS)?,
        };
        if let Ok(path) = std::env::var("PEGASUS_STORAGE_PATH") {
            config.storage_path = PathBuf::from(path);
        }
        Ok(config)
    }
}

fn parse_backend_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.trim_end_matches('/').to_owned())
    } else {
        Err(ConfigError::Invalid { var: "PEGASUS_BACKEND_URL", value: raw.to_owned() })
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_parse_u64(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid { var: key, value: raw }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
