use log::info;
use orchard_model::prelude::*;

use crate::api_client::ApiClient;
use crate::error::ClientResult;
use crate::routes;

impl ApiClient {
    /// Remaining spins
    pub async fn spin_status(&self) -> ClientResult<SpinStatus> {
        self.get(routes::spin::WHEEL).await
    }

    /// Spin the wheel. The outcome is decided server-side.
    pub async fn spin(&self) -> ClientResult<SpinOutcome> {
        let outcome: SpinOutcome = self
            .post(routes::spin::WHEEL, &serde_json::json!({}))
            .await?;
        info!(
            "[ApiClient] Spin landed on segment {} ({})",
            outcome.segment, outcome.label
        );
        self.refresh_user_snapshot().await;
        Ok(outcome)
    }
}
