//! Administrator endpoints. The server enforces the admin role; calling these
//! as a regular user yields a `RequestFailed` with status 403.

use log::info;
use orchard_model::prelude::*;

use crate::api_client::ApiClient;
use crate::error::ClientResult;
use crate::routes;

impl ApiClient {
    /// All users
    pub async fn admin_users(&self) -> ClientResult<Vec<AdminUserRow>> {
        self.get(routes::admin::USERS).await
    }

    /// Withdrawals awaiting a decision
    pub async fn admin_withdrawals(&self) -> ClientResult<Vec<AdminWithdrawal>> {
        self.get(routes::admin::WITHDRAWALS).await
    }

    /// Approve a withdrawal
    pub async fn approve_withdrawal(&self, id: &str) -> ClientResult<AdminWithdrawal> {
        info!("[ApiClient] Approving withdrawal {}", id);
        self.post(
            &routes::admin::approve_withdrawal(id),
            &WithdrawalDecision::default(),
        )
        .await
    }

    /// Reject a withdrawal with an optional reason
    pub async fn reject_withdrawal(
        &self,
        id: &str,
        reason: Option<String>,
    ) -> ClientResult<AdminWithdrawal> {
        info!("[ApiClient] Rejecting withdrawal {}", id);
        self.post(
            &routes::admin::reject_withdrawal(id),
            &WithdrawalDecision { reason },
        )
        .await
    }
}
