//! Harness configuration from the process environment.

use std::time::Duration;

use tracing::warn;

use crate::types::AuthRequest;

pub const DEFAULT_BASE_URL: &str = "https://restful-booker.herokuapp.com";
pub const DEFAULT_USER: &str = "admin";
pub const DEFAULT_PASS: &str = "password123";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

pub const ENV_BASE_URL: &str = "BOOKER_BASE_URL";
pub const ENV_USER: &str = "BOOKER_USER";
pub const ENV_PASS: &str = "BOOKER_PASS";
pub const ENV_TIMEOUT_MS: &str = "BOOKER_TIMEOUT_MS";

/// Where to send requests and which credentials back the worker token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: DEFAULT_USER.to_string(),
            password: DEFAULT_PASS.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Empty values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let timeout = match get(ENV_TIMEOUT_MS) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(err) => {
                    warn!(value = %raw, error = %err, "invalid {ENV_TIMEOUT_MS}, using default");
                    defaults.timeout
                }
            },
            None => defaults.timeout,
        };

        Self {
            base_url: get(ENV_BASE_URL).unwrap_or(defaults.base_url),
            username: get(ENV_USER).unwrap_or(defaults.username),
            password: get(ENV_PASS).unwrap_or(defaults.password),
            timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn credentials(&self) -> AuthRequest {
        AuthRequest {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}
