use orchard_model::prelude::*;

use crate::api_client::ApiClient;
use crate::error::ClientResult;
use crate::routes;

impl ApiClient {
    /// Referral tree below the current user, with commission totals
    pub async fn team(&self) -> ClientResult<TeamSummary> {
        self.get(routes::team::SUMMARY).await
    }
}
