//! Client runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the client and
//! workflow. Nothing reads process-wide environment variables while a request is in flight.
//! The `*_from_env_value(s)` helpers take plain `Option<String>` values so they can be tested
//! without mutating the environment.

use crate::constants::{
    API_BASE_URL_ENV, API_TIMEOUT_ENV, DEFAULT_PUBLIC_BASE_URL, DEFAULT_SERVER_BASE_URL,
    DEFAULT_TIMEOUT_SECS, PUBLIC_API_BASE_URL_ENV, RESCORE_POLICY_ENV,
};
use crate::error::{ConfigError, ConfigResult};
use crate::validation::validate_base_url;
use std::time::Duration;

/// Which side of the deployment is making calls.
///
/// Server-side callers can reach the service on an internal address, while browser-side
/// callers need the publicly reachable one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallerSide {
    #[default]
    Server,
    Browser,
}

/// What happens to the last successful score when a re-score fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RescorePolicy {
    /// Keep showing the last successful score next to the error message.
    #[default]
    KeepLastScore,
    /// Blank the score and show only the error.
    ClearScore,
}

/// Client configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    base_url: String,
    timeout: Duration,
    rescore_policy: RescorePolicy,
}

impl ClientConfig {
    /// Create a new `ClientConfig`, validating the base URL.
    pub fn new(base_url: impl AsRef<str>) -> ConfigResult<Self> {
        Ok(Self {
            base_url: validate_base_url(base_url.as_ref())?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            rescore_policy: RescorePolicy::default(),
        })
    }

    /// Resolve configuration from the process environment for the given caller side.
    pub fn from_env(side: CallerSide) -> ConfigResult<Self> {
        let server = std::env::var(API_BASE_URL_ENV).ok();
        let public = std::env::var(PUBLIC_API_BASE_URL_ENV).ok();

        let base_url = match side {
            CallerSide::Server => base_url_from_env_values(server, public, DEFAULT_SERVER_BASE_URL),
            CallerSide::Browser => base_url_from_env_values(public, None, DEFAULT_PUBLIC_BASE_URL),
        };

        let timeout = timeout_from_env_value(std::env::var(API_TIMEOUT_ENV).ok())?;
        let rescore_policy = rescore_policy_from_env_value(std::env::var(RESCORE_POLICY_ENV).ok())?;

        Ok(Self::new(base_url)?
            .with_timeout(timeout)
            .with_rescore_policy(rescore_policy))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_rescore_policy(mut self, policy: RescorePolicy) -> Self {
        self.rescore_policy = policy;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn rescore_policy(&self) -> RescorePolicy {
        self.rescore_policy
    }
}

/// Pick the first non-blank value, falling back to `default`.
pub fn base_url_from_env_values(
    primary: Option<String>,
    fallback: Option<String>,
    default: &str,
) -> String {
    [primary, fallback]
        .into_iter()
        .flatten()
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Parse the request timeout from an optional string value.
///
/// If `value` is `None` or blank, returns the default timeout.
pub fn timeout_from_env_value(value: Option<String>) -> ConfigResult<Duration> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        Some(v) => match v.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(ConfigError::InvalidTimeout(v)),
        },
    }
}

/// Parse the re-score policy from an optional string value.
pub fn rescore_policy_from_env_value(value: Option<String>) -> ConfigResult<RescorePolicy> {
    let value = value
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty());

    match value.as_deref() {
        None | Some("keep") => Ok(RescorePolicy::KeepLastScore),
        Some("clear") => Ok(RescorePolicy::ClearScore),
        Some(other) => Err(ConfigError::InvalidRescorePolicy(other.to_string())),
    }
}
