//! Authentication: token persistence, the refresh lifecycle, and session
//! operations (login, register, logout).

pub mod credentials;
/// Access-token renewal
pub mod lifecycle;
mod session;

pub use credentials::Credentials;
pub use lifecycle::{TokenLifecycle, TokenStatus};
