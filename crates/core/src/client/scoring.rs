//! Scoring endpoint.

use tracing::{debug, info};

use super::ApiClient;
use crate::error::{ClientResult, Operation, Resource};
use crate::score::RubricScore;
use crate::signout::SignoutId;

impl ApiClient {
    /// Ask the service to evaluate a signout (`POST /api/signouts/{signout_id}/score`).
    ///
    /// The request has an empty body. Results are not cached: calling twice asks the service
    /// twice, and the rubric version may differ between answers.
    pub async fn score_signout(&self, signout_id: &SignoutId) -> ClientResult<RubricScore> {
        let url = self.endpoint(&["api", "signouts", signout_id.as_str(), "score"]);
        debug!(url = %url, "requesting score");

        let response = self
            .send(
                Operation::ScoreSignout,
                self.client.post(url),
                Some((Resource::Signout, signout_id.as_str())),
            )
            .await?;
        let score: RubricScore = Self::read_json(Operation::ScoreSignout, response).await?;

        info!(
            signout_id = %signout_id,
            total_score = score.total_score,
            rubric_version = %score.rubric_version,
            "signout scored"
        );
        Ok(score)
    }
}
