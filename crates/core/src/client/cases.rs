//! Case repository endpoints.

use tracing::debug;

use super::ApiClient;
use crate::case::{CaseDetail, CaseSummary, ViewMode};
use crate::constants::CASES_PATH;
use crate::error::{ClientError, ClientResult, Operation, Resource};

impl ApiClient {
    /// List case summaries (`GET /api/cases`).
    pub async fn list_cases(&self) -> ClientResult<Vec<CaseSummary>> {
        let url = self.endpoint_path(CASES_PATH);
        debug!(url = %url, "listing cases");

        let response = self
            .send(Operation::ListCases, self.client.get(url), None)
            .await?;
        Self::read_json(Operation::ListCases, response).await
    }

    /// Fetch a case and its snapshot (`GET /api/cases/{case_id}?mode={mode}`).
    ///
    /// A blank id names no case and is reported as `NotFound` without a request.
    pub async fn get_case(&self, case_id: &str, mode: &ViewMode) -> ClientResult<CaseDetail> {
        if case_id.trim().is_empty() {
            debug!("blank case id");
            return Err(ClientError::NotFound {
                resource: Resource::Case,
                id: case_id.to_string(),
            });
        }

        let mut url = self.endpoint_path(CASES_PATH);
        if let Ok(mut path) = url.path_segments_mut() {
            path.push(case_id);
        }
        url.query_pairs_mut().append_pair("mode", mode.as_str());
        debug!(url = %url, case_id, mode = %mode, "fetching case");

        let response = self
            .send(
                Operation::GetCase,
                self.client.get(url),
                Some((Resource::Case, case_id)),
            )
            .await?;
        Self::read_json(Operation::GetCase, response).await
    }
}
