//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ApiError;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

const TOKEN_DIR: &str = ".palografico";
const TOKEN_FILE: &str = "token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub token: Option<String>,
    pub token_file: PathBuf,
    pub poll_interval: Duration,
    pub timeouts: Timeouts,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// All optional:
    /// - `PALO_API_URL`: backend base URL, default `http://localhost:8000`
    /// - `PALO_TOKEN`: bearer token
    /// - `PALO_TOKEN_FILE`: stored token path, default `~/.palografico/token`
    /// - `PALO_POLL_INTERVAL_MS`: default 2000
    /// - `PALO_REQUEST_TIMEOUT_SECS`: default 30
    /// - `PALO_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] when the URL is not http(s) or no token
    /// path can be derived.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let api_url = normalize_api_url(&lookup("PALO_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_owned()))?;
        let token = lookup("PALO_TOKEN").map(|t| t.trim().to_owned()).filter(|t| !t.is_empty());
        let token_file = match lookup("PALO_TOKEN_FILE") {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_token_file()?,
        };
        let poll_interval = Duration::from_millis(parse_u64(
            lookup("PALO_POLL_INTERVAL_MS").as_deref(),
            DEFAULT_POLL_INTERVAL_MS,
        ));
        let timeouts = Timeouts {
            request_secs: parse_u64(lookup("PALO_REQUEST_TIMEOUT_SECS").as_deref(), DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64(lookup("PALO_CONNECT_TIMEOUT_SECS").as_deref(), DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { api_url, token, token_file, poll_interval, timeouts })
    }

    /// Replace the base URL (command-line override).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] for a non-http(s) URL.
    pub fn with_api_url(mut self, raw: &str) -> Result<Self, ApiError> {
        self.api_url = normalize_api_url(raw)?;
        Ok(self)
    }
}

/// Trim whitespace and trailing slashes; require an http(s) scheme.
///
/// # Errors
///
/// Returns [`ApiError::Config`] for any other scheme.
pub fn normalize_api_url(raw: &str) -> Result<String, ApiError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_owned())
    } else {
        Err(ApiError::Config(format!("API URL must start with http:// or https://, got `{raw}`")))
    }
}

fn parse_u64(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

fn default_token_file() -> Result<PathBuf, ApiError> {
    dirs::home_dir()
        .map(|home| home.join(TOKEN_DIR).join(TOKEN_FILE))
        .ok_or_else(|| ApiError::Config("cannot locate home directory; set PALO_TOKEN_FILE".to_owned()))
}
