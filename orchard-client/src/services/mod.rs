//! Typed endpoint wrappers
//!
//! Each submodule adds an `impl ApiClient` block for one area of the API. All
//! calls go through [`ApiClient::authenticated_request`](crate::ApiClient::authenticated_request).

pub mod account;
/// Administrator tools
pub mod admin;
/// Testimonials
pub mod forum;
/// Catalogue and purchases
pub mod products;
/// Prize wheel
pub mod spin;
/// Referral team
pub mod team;
/// Bank account, withdrawals and ledger
pub mod wallet;
