//! Client configuration.
//!
//! Defaults match the deployed console: a fixed local base URL, a ten
//! second request deadline, and the marker the backend puts in messages
//! about expired tokens. Each can be overridden from the environment.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://0.0.0.0:3000/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_EXPIRY_MARKER: &str = "ExpiredSignature";

pub const BASE_URL_ENV: &str = "ADMIN_API_BASE_URL";
pub const TIMEOUT_ENV: &str = "ADMIN_API_TIMEOUT_SECS";
pub const EXPIRY_MARKER_ENV: &str = "ADMIN_SESSION_EXPIRY_MARKER";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Substring of an error message that signals an expired session.
    pub expiry_marker: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            expiry_marker: DEFAULT_EXPIRY_MARKER.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unparseable or empty values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }
        if let Some(secs) = lookup(TIMEOUT_ENV).and_then(|v| v.trim().parse::<u64>().ok()) {
            if secs > 0 {
                config.timeout = Duration::from_secs(secs);
            }
        }
        if let Some(marker) = lookup(EXPIRY_MARKER_ENV).filter(|v| !v.is_empty()) {
            config.expiry_marker = marker;
        }
        config
    }
}
