use orchard_model::prelude::*;

use crate::api_client::ApiClient;
use crate::error::ClientResult;
use crate::routes;

impl ApiClient {
    /// The registered payout account, if any
    pub async fn bank_account(&self) -> ClientResult<Option<BankAccount>> {
        self.get(routes::wallet::BANK).await
    }

    /// Register or replace the payout account
    pub async fn save_bank_account(&self, account: &BankAccount) -> ClientResult<BankAccount> {
        let saved: BankAccount = self.put(routes::wallet::BANK, account).await?;
        self.refresh_user_snapshot().await;
        Ok(saved)
    }

    /// Request a payout; fees and limits are enforced server-side
    pub async fn request_withdrawal(&self, amount: f64) -> ClientResult<Withdrawal> {
        let withdrawal: Withdrawal = self
            .post(routes::wallet::WITHDRAWALS, &WithdrawalRequest { amount })
            .await?;
        self.refresh_user_snapshot().await;
        Ok(withdrawal)
    }

    /// Withdrawal history
    pub async fn withdrawals(&self) -> ClientResult<Vec<Withdrawal>> {
        self.get(routes::wallet::WITHDRAWALS).await
    }

    /// Wallet ledger
    pub async fn transactions(&self) -> ClientResult<Vec<Transaction>> {
        self.get(routes::wallet::TRANSACTIONS).await
    }
}
