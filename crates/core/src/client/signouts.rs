//! Signout repository endpoints: create, fetch, list by case.

use tracing::{debug, info};

use super::ApiClient;
use crate::constants::SIGNOUTS_PATH;
use crate::error::{ClientResult, Operation, Resource};
use crate::signout::{NewSignout, Signout, SignoutCreated, SignoutId, SignoutMetadata};

impl ApiClient {
    /// Create a signout (`POST /api/signouts`).
    ///
    /// Sends exactly one request; 200 and 201 are both accepted.
    pub async fn create_signout(&self, signout: &NewSignout) -> ClientResult<SignoutCreated> {
        let url = self.endpoint_path(SIGNOUTS_PATH);
        debug!(url = %url, case_id = %signout.case_id, "creating signout");

        let response = self
            .send(
                Operation::CreateSignout,
                self.client.post(url).json(signout),
                None,
            )
            .await?;
        let created: SignoutCreated = Self::read_json(Operation::CreateSignout, response).await?;

        info!(signout_id = %created.signout_id, case_id = %signout.case_id, "signout created");
        Ok(created)
    }

    /// Fetch a persisted signout (`GET /api/signouts/{signout_id}`).
    ///
    /// A 404 is reported as `ClientError::NotFound`, separate from transport failures.
    pub async fn get_signout(&self, signout_id: &SignoutId) -> ClientResult<Signout> {
        let url = self.endpoint(&["api", "signouts", signout_id.as_str()]);
        debug!(url = %url, "fetching signout");

        let response = self
            .send(
                Operation::GetSignout,
                self.client.get(url),
                Some((Resource::Signout, signout_id.as_str())),
            )
            .await?;
        Self::read_json(Operation::GetSignout, response).await
    }

    /// List signouts written for a case (`GET /api/signouts?case_id={case_id}`).
    pub async fn list_signouts(&self, case_id: &str) -> ClientResult<Vec<SignoutMetadata>> {
        let mut url = self.endpoint_path(SIGNOUTS_PATH);
        url.query_pairs_mut().append_pair("case_id", case_id);
        debug!(url = %url, "listing signouts for case");

        let response = self
            .send(Operation::ListSignouts, self.client.get(url), None)
            .await?;
        Self::read_json(Operation::ListSignouts, response).await
    }
}
