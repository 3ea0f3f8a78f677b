//! Error taxonomy for calls to the signout service.
//!
//! `ValidationFailed` is deliberately absent: it is resolved inside the composer and
//! never reaches the network layer (see [`crate::composer::ComposerError`]).

use std::fmt;

/// The service operation an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Health,
    ListCases,
    GetCase,
    CreateSignout,
    GetSignout,
    ListSignouts,
    ScoreSignout,
}

impl Operation {
    fn describe(self) -> &'static str {
        match self {
            Self::Health => "check the service",
            Self::ListCases => "load the case list",
            Self::GetCase => "load the case",
            Self::CreateSignout => "create the signout",
            Self::GetSignout => "load the signout",
            Self::ListSignouts => "load signouts for the case",
            Self::ScoreSignout => "score the signout",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Health => "health",
            Self::ListCases => "list_cases",
            Self::GetCase => "get_case",
            Self::CreateSignout => "create_signout",
            Self::GetSignout => "get_signout",
            Self::ListSignouts => "list_signouts",
            Self::ScoreSignout => "score_signout",
        };
        f.write_str(name)
    }
}

/// Which kind of resource a `NotFound` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Case,
    Signout,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Case => f.write_str("case"),
            Self::Signout => f.write_str("signout"),
        }
    }
}

/// Errors returned by the service clients.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// The identifier does not exist on the service (HTTP 404).
    #[error("{resource} not found: {id}")]
    NotFound { resource: Resource, id: String },

    /// Network down, timeout, or a response that could not be parsed.
    #[error("service unavailable during {operation}: {message}")]
    ServiceUnavailable { operation: Operation, message: String },

    /// The service answered with a non-2xx status other than 404.
    #[error("{operation} failed with status {status}")]
    RequestFailed { operation: Operation, status: u16 },
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// HTTP status for diagnostics, when the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::RequestFailed { status, .. } => Some(*status),
            Self::ServiceUnavailable { .. } => None,
        }
    }

    /// Text suitable for showing to the trainee.
    ///
    /// Never contains status codes or transport detail; those stay in `Display` and the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { resource, .. } => format!("This {resource} does not exist."),
            Self::ServiceUnavailable { operation, .. } => format!(
                "Could not reach the signout service to {}. Please try again.",
                operation.describe()
            ),
            Self::RequestFailed {
                operation: Operation::ScoreSignout,
                ..
            } => "Unable to score this signout. Please try again.".to_string(),
            Self::RequestFailed { operation, .. } => {
                format!("Failed to {}. Please try again.", operation.describe())
            }
        }
    }
}

/// Result type for service client operations.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Errors raised while resolving configuration at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("invalid timeout {0:?}: expected a positive number of seconds")]
    InvalidTimeout(String),
    #[error("invalid rescore policy {0:?}: expected \"keep\" or \"clear\"")]
    InvalidRescorePolicy(String),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
