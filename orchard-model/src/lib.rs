//! Wire data models shared across Orchard crates.
//!
//! Every type here mirrors a JSON shape exchanged with the platform API. The
//! server owns all business rules (accrual, commissions, spin outcomes); these
//! structs only carry the results.
#![allow(missing_docs)]

pub mod admin;
pub mod api;
pub mod auth;
pub mod forum;
pub mod prelude;
pub mod product;
pub mod settings;
pub mod spin;
pub mod team;
pub mod user;
pub mod wallet;

pub use api::ApiErrorBody;
pub use auth::{
    AuthPayload, LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest,
    TokenGrant,
};
pub use settings::{APPLICATION_SETTINGS_VERSION, ApplicationSettings};
pub use user::UserProfile;
