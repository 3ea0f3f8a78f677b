//! Input validation utilities.
//!
//! Checks applied to configuration values before they are used to build requests.

use crate::error::{ConfigError, ConfigResult};

/// Validates a service base URL and returns it normalised (no trailing slash).
///
/// Guardrails:
/// - rejects empty or whitespace-only strings
/// - only `http` and `https` schemes
/// - no query string or fragment, since paths are appended to the base
///
/// # Errors
///
/// Returns `ConfigError::InvalidBaseUrl` if the URL is unusable as a base.
pub fn validate_base_url(raw: &str) -> ConfigResult<String> {
    let invalid = |reason: &str| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid("base URL cannot be empty"));
    }

    let parsed = url::Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if parsed.host_str().is_none() {
        return Err(invalid("missing host"));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid("must not contain a query or fragment"));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_removed() {
        assert_eq!(
            validate_base_url("http://localhost:8000/").unwrap(),
            "http://localhost:8000"
        );
        assert_eq!(
            validate_base_url(" https://signout.example.org/api-root// ").unwrap(),
            "https://signout.example.org/api-root"
        );
    }

    #[test]
    fn rejects_empty_and_non_http() {
        assert!(validate_base_url("   ").is_err());
        assert!(validate_base_url("ftp://backend:8000").is_err());
        assert!(validate_base_url("backend:8000").is_err());
    }

    #[test]
    fn rejects_query_and_fragment() {
        assert!(validate_base_url("http://backend:8000/?x=1").is_err());
        assert!(validate_base_url("http://backend:8000/#top").is_err());
    }
}
