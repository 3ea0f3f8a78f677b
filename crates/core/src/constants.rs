//! Constants used throughout the signout core crate.
//!
//! Environment variable names, defaults and service paths live here so the client,
//! the configuration layer and the tests agree on them.

/// Base URL used by server-side callers.
pub const API_BASE_URL_ENV: &str = "SIGNOUT_API_BASE_URL";

/// Base URL used by browser/public callers; also the server-side fallback.
pub const PUBLIC_API_BASE_URL_ENV: &str = "SIGNOUT_PUBLIC_API_BASE_URL";

/// Request timeout in whole seconds.
pub const API_TIMEOUT_ENV: &str = "SIGNOUT_API_TIMEOUT_SECS";

/// Behaviour of a failed re-score (`keep` or `clear`).
pub const RESCORE_POLICY_ENV: &str = "SIGNOUT_RESCORE_POLICY";

/// Default base URL for server-side callers (container network name).
pub const DEFAULT_SERVER_BASE_URL: &str = "http://backend:8000";

/// Default base URL for browser/public callers.
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8000";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent sent with every request.
pub const USER_AGENT_VALUE: &str = concat!("signout-core/", env!("CARGO_PKG_VERSION"));

pub const HEALTH_PATH: &str = "/health";
pub const CASES_PATH: &str = "/api/cases";
pub const SIGNOUTS_PATH: &str = "/api/signouts";
