#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::settings::ApplicationSettings;
use crate::user::UserProfile;

/// Credentials for `/login`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoginRequest {
    /// Username or phone number, whichever the account was created with
    pub identifier: String,
    pub password: String,
}

/// Account creation payload for `/register`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegisterRequest {
    pub username: String,
    pub phone: String,
    pub password: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub referral_code: Option<String>,
}

/// Body of `/refresh`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Body of `/logout`
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LogoutRequest {
    pub refresh_token: String,
}

/// Token material minted by login, register and refresh.
///
/// `access_token_expires_at` is an absolute timestamp in milliseconds since the
/// Unix epoch. It is stored exactly as received.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TokenGrant {
    pub access_token: String,
    pub access_token_expires_at: i64,
    /// Present when the server rotates the refresh token
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub refresh_token: Option<String>,
}

impl TokenGrant {
    /// A grant is usable only when it actually carries an access token
    pub fn is_usable(&self) -> bool {
        !self.access_token.trim().is_empty()
    }
}

/// Response of `/login` and `/register`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AuthPayload {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub grant: TokenGrant,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub user: Option<UserProfile>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub application: Option<ApplicationSettings>,
}
