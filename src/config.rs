//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::time::Duration;

use crate::error::AuthError;

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayKind {
    /// Real backend over HTTP.
    Http,
    /// In-process stand-in that accepts any well-formed credentials.
    Mock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Timeouts {
    #[must_use]
    pub fn request(self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL without a trailing slash, e.g. `http://localhost:3000/api`.
    pub api_base_url: String,
    pub gateway: GatewayKind,
    pub timeouts: Timeouts,
    /// Where tokens persist. `None` keeps them in memory.
    pub token_file: Option<PathBuf>,
    /// Simulated latency for the mock gateway.
    pub mock_delay: Duration,
    /// Where the mock gateway keeps its server-side session. `None` keeps it in memory.
    pub mock_state_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_owned(),
            gateway: GatewayKind::Http,
            timeouts: Timeouts::default(),
            token_file: None,
            mock_delay: Duration::ZERO,
            mock_state_file: None,
        }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `LOVELE_API_URL`: default `http://localhost:3000/api`
    /// - `LOVELE_GATEWAY`: `http` (default) or `mock`
    /// - `LOVELE_REQUEST_TIMEOUT_SECS`: default 30
    /// - `LOVELE_CONNECT_TIMEOUT_SECS`: default 10
    /// - `LOVELE_TOKEN_FILE`: persist tokens to this JSON file
    /// - `LOVELE_MOCK_DELAY_MS`: default 0
    /// - `LOVELE_MOCK_STATE_FILE`: persist the mock backend's session to this JSON file
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] for an unknown gateway kind or a
    /// non-numeric duration.
    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AuthError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = normalize_base_url(lookup("LOVELE_API_URL").as_deref());
        let gateway = parse_gateway(lookup("LOVELE_GATEWAY").as_deref())?;
        let timeouts = Timeouts {
            request_secs: parse_u64(
                "LOVELE_REQUEST_TIMEOUT_SECS",
                lookup("LOVELE_REQUEST_TIMEOUT_SECS").as_deref(),
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
            connect_secs: parse_u64(
                "LOVELE_CONNECT_TIMEOUT_SECS",
                lookup("LOVELE_CONNECT_TIMEOUT_SECS").as_deref(),
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )?,
        };
        let token_file = parse_path(lookup("LOVELE_TOKEN_FILE"));
        let mock_state_file = parse_path(lookup("LOVELE_MOCK_STATE_FILE"));
        let mock_delay =
            Duration::from_millis(parse_u64("LOVELE_MOCK_DELAY_MS", lookup("LOVELE_MOCK_DELAY_MS").as_deref(), 0)?);

        Ok(Self { api_base_url, gateway, timeouts, token_file, mock_delay, mock_state_file })
    }
}

pub(crate) fn normalize_base_url(raw: Option<&str>) -> String {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        Some(url) => url.trim_end_matches('/').to_owned(),
        None => DEFAULT_API_URL.to_owned(),
    }
}

fn parse_path(raw: Option<String>) -> Option<PathBuf> {
    raw.filter(|v| !v.trim().is_empty()).map(PathBuf::from)
}

fn parse_gateway(raw: Option<&str>) -> Result<GatewayKind, AuthError> {
    match raw.map(str::trim).unwrap_or("http") {
        "http" | "" => Ok(GatewayKind::Http),
        "mock" => Ok(GatewayKind::Mock),
        other => Err(AuthError::Config(format!("unknown LOVELE_GATEWAY: {other} (expected 'http' or 'mock')"))),
    }
}

fn parse_u64(key: &str, raw: Option<&str>, default: u64) -> Result<u64, AuthError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => v
            .parse::<u64>()
            .map_err(|_| AuthError::Config(format!("{key} must be a non-negative integer, got '{v}'"))),
        None => Ok(default),
    }
}
