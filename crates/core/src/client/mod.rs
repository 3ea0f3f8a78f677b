//! HTTP client for the signout service.
//!
//! [`SignoutService`] is the seam the composer and workflow are written against;
//! [`ApiClient`] is the reqwest-backed implementation. Requests are never retried here:
//! failures surface to the caller, which lets the trainee retry the triggering action.

mod cases;
mod scoring;
mod signouts;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::case::{CaseDetail, CaseSummary, ViewMode};
use crate::config::ClientConfig;
use crate::constants::{HEALTH_PATH, USER_AGENT_VALUE};
use crate::error::{ClientError, ClientResult, ConfigError, ConfigResult, Operation, Resource};
use crate::score::RubricScore;
use crate::signout::{NewSignout, Signout, SignoutCreated, SignoutId, SignoutMetadata};

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

/// Operations offered by the external signout service.
#[async_trait]
pub trait SignoutService: Send + Sync {
    async fn health(&self) -> ClientResult<HealthStatus>;

    async fn list_cases(&self) -> ClientResult<Vec<CaseSummary>>;

    /// Fetch a case with its snapshot. `mode` is forwarded untouched.
    async fn get_case(&self, case_id: &str, mode: &ViewMode) -> ClientResult<CaseDetail>;

    /// Issue exactly one create request.
    async fn create_signout(&self, signout: &NewSignout) -> ClientResult<SignoutCreated>;

    async fn get_signout(&self, signout_id: &SignoutId) -> ClientResult<Signout>;

    async fn list_signouts(&self, case_id: &str) -> ClientResult<Vec<SignoutMetadata>>;

    /// Trigger a fresh rubric evaluation. Never cached.
    async fn score_signout(&self, signout_id: &SignoutId) -> ClientResult<RubricScore>;
}

/// reqwest-backed [`SignoutService`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new client from resolved configuration.
    pub fn new(config: &ClientConfig) -> ConfigResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .default_headers(default_headers)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        let base_url = Url::parse(config.base_url()).map_err(|e| ConfigError::InvalidBaseUrl {
            url: config.base_url().to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// Build a URL by appending percent-encoded path segments to the base.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Build a URL from a constant path such as `/api/cases`.
    fn endpoint_path(&self, path: &str) -> Url {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        self.endpoint(&segments)
    }

    /// Send a request once and map the status code onto the error taxonomy.
    ///
    /// `subject` names the resource a 404 refers to; without one a 404 is an ordinary
    /// request failure.
    async fn send(
        &self,
        operation: Operation,
        request: RequestBuilder,
        subject: Option<(Resource, &str)>,
    ) -> ClientResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(operation, e))?;
        let status = response.status();

        match (status.as_u16(), subject) {
            (200..=299, _) => Ok(response),
            (404, Some((resource, id))) => {
                debug!(%operation, %resource, id, "resource not found");
                Err(ClientError::NotFound {
                    resource,
                    id: id.to_string(),
                })
            }
            (code, _) => {
                warn!(%operation, status = code, "service returned an error status");
                Err(ClientError::RequestFailed {
                    operation,
                    status: code,
                })
            }
        }
    }

    async fn read_json<T: DeserializeOwned>(
        operation: Operation,
        response: Response,
    ) -> ClientResult<T> {
        response
            .json()
            .await
            .map_err(|e| ClientError::ServiceUnavailable {
                operation,
                message: format!("failed to parse response: {e}"),
            })
    }

    pub async fn health(&self) -> ClientResult<HealthStatus> {
        let url = self.endpoint_path(HEALTH_PATH);
        debug!(url = %url, "checking service health");

        let response = self
            .send(Operation::Health, self.client.get(url), None)
            .await?;
        Self::read_json(Operation::Health, response).await
    }
}

/// Map a reqwest transport failure (connect, timeout, body) to `ServiceUnavailable`.
fn transport_error(operation: Operation, err: reqwest::Error) -> ClientError {
    let kind = if err.is_timeout() {
        "timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    warn!(%operation, error = %err, "{kind}");
    ClientError::ServiceUnavailable {
        operation,
        message: format!("{kind}: {err}"),
    }
}

#[async_trait]
impl SignoutService for ApiClient {
    async fn health(&self) -> ClientResult<HealthStatus> {
        ApiClient::health(self).await
    }

    async fn list_cases(&self) -> ClientResult<Vec<CaseSummary>> {
        ApiClient::list_cases(self).await
    }

    async fn get_case(&self, case_id: &str, mode: &ViewMode) -> ClientResult<CaseDetail> {
        ApiClient::get_case(self, case_id, mode).await
    }

    async fn create_signout(&self, signout: &NewSignout) -> ClientResult<SignoutCreated> {
        ApiClient::create_signout(self, signout).await
    }

    async fn get_signout(&self, signout_id: &SignoutId) -> ClientResult<Signout> {
        ApiClient::get_signout(self, signout_id).await
    }

    async fn list_signouts(&self, case_id: &str) -> ClientResult<Vec<SignoutMetadata>> {
        ApiClient::list_signouts(self, case_id).await
    }

    async fn score_signout(&self, signout_id: &SignoutId) -> ClientResult<RubricScore> {
        ApiClient::score_signout(self, signout_id).await
    }
}
