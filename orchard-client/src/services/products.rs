use orchard_model::prelude::*;

use crate::api_client::ApiClient;
use crate::error::ClientResult;
use crate::routes;

impl ApiClient {
    /// Full catalogue
    pub async fn products(&self) -> ClientResult<Vec<Product>> {
        self.get(routes::products::LIST).await
    }

    /// One product by id
    pub async fn product(&self, id: &str) -> ClientResult<Product> {
        self.get(&routes::products::by_id(id)).await
    }

    /// Buy `quantity` units of a product. The server debits the balance and
    /// opens the investment.
    pub async fn purchase(&self, id: &str, quantity: u32) -> ClientResult<Investment> {
        let investment: Investment = self
            .post(&routes::products::purchase(id), &PurchaseRequest { quantity })
            .await?;
        self.refresh_user_snapshot().await;
        Ok(investment)
    }

    /// The user's investments
    pub async fn investments(&self) -> ClientResult<Vec<Investment>> {
        self.get(routes::products::INVESTMENTS).await
    }
}
