//! Orchard API client
//!
//! This crate is the orchestration layer between Orchard front ends and the
//! platform API. The API owns every business rule; the client owns the
//! authentication token lifecycle:
//!
//! - access tokens live in a session-scoped store together with their absolute
//!   expiry
//! - the refresh token lives in a cookie jar with a 30-day max-age
//! - every authenticated call goes through [`ApiClient::authenticated_request`],
//!   which renews the access token shortly before it expires and performs at
//!   most one refresh-and-retry when the server reports an invalid token
//! - concurrent renewals are collapsed into a single `/refresh` call by
//!   [`single_flight::SingleFlight`]
//!
//! Typed endpoint wrappers (products, wallet, team, spin, forum, admin) live in
//! [`services`] as additional `impl ApiClient` blocks.

pub mod api_client;
/// Token storage, renewal and session operations
pub mod auth;
/// Time source
pub mod clock;
/// Client configuration
pub mod config;
/// Client error type
pub mod error;
/// API paths
pub mod routes;
/// Typed endpoint wrappers
pub mod services;
/// Shared-outcome execution
pub mod single_flight;
/// Key-value stores and cookie jar
pub mod storage;

pub use api_client::{ApiClient, ApiClientBuilder, RequestOptions};
pub use auth::credentials::Credentials;
pub use auth::lifecycle::TokenLifecycle;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, ClientResult};
pub use storage::{CookieJar, FileStore, KeyValueStore, MemoryStore, StorageError};

pub use orchard_model as model;
