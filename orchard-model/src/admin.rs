use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::wallet::WithdrawalStatus;

/// Row in the admin user list
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AdminUserRow {
    pub id: String,
    pub username: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub phone: Option<String>,
    pub balance: f64,
    pub vip_level: u8,
    pub created_at: DateTime<Utc>,
}

/// Withdrawal awaiting an admin decision
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AdminWithdrawal {
    pub id: String,
    pub user_id: String,
    pub username: String,
    pub amount: f64,
    pub bank_name: String,
    pub account_number: String,
    pub status: WithdrawalStatus,
    pub requested_at: DateTime<Utc>,
}

/// Body for rejecting a withdrawal
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WithdrawalDecision {
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub reason: Option<String>,
}
