//! Convenience re-exports for client and CLI code.

pub use crate::admin::{AdminUserRow, AdminWithdrawal, WithdrawalDecision};
pub use crate::api::{ApiErrorBody, INVALID_TOKEN_CODE};
pub use crate::auth::{
    AuthPayload, LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest,
    TokenGrant,
};
pub use crate::forum::{ForumPost, ModerationState, NewForumPost};
pub use crate::product::{Investment, InvestmentStatus, Product, PurchaseRequest};
pub use crate::settings::{APPLICATION_SETTINGS_VERSION, ApplicationSettings};
pub use crate::spin::{SpinOutcome, SpinStatus};
pub use crate::team::{ReferralMember, TeamSummary};
pub use crate::user::{PasswordChange, ProfileUpdate, UserProfile};
pub use crate::wallet::{
    BankAccount, Transaction, TransactionKind, Withdrawal, WithdrawalRequest,
    WithdrawalStatus,
};
