//! Token and snapshot persistence
//!
//! [`Credentials`] is the only writer of session state. Keys:
//!
//! | Scope   | Key                       | Value                        |
//! |---------|---------------------------|------------------------------|
//! | session | `access_token`            | bearer string                |
//! | session | `access_token_expires_at` | epoch milliseconds           |
//! | cookie  | `refresh_token`           | refresh string, 30-day max-age |
//! | local   | `user`                    | JSON [`UserProfile`]         |
//! | local   | `application`             | JSON [`ApplicationSettings`] |

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use orchard_model::{ApplicationSettings, TokenGrant, UserProfile};

use crate::clock::Clock;
use crate::storage::{CookieJar, KeyValueStore, StorageError, get_json, set_json};

/// Session key of the bearer token
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Session key of the expiry, epoch milliseconds
pub const ACCESS_TOKEN_EXPIRES_AT_KEY: &str = "access_token_expires_at";
/// Cookie holding the refresh token
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";
/// Local key of the user snapshot
pub const USER_KEY: &str = "user";
/// Local key of the settings snapshot
pub const APPLICATION_KEY: &str = "application";

/// Reads and writes tokens and snapshots across the three stores
#[derive(Clone, Debug)]
pub struct Credentials {
    session: Arc<dyn KeyValueStore>,
    local: Arc<dyn KeyValueStore>,
    cookies: CookieJar,
    refresh_cookie_ttl: Duration,
}

impl Credentials {
    /// Credentials over the given stores
    pub fn new(
        session: Arc<dyn KeyValueStore>,
        local: Arc<dyn KeyValueStore>,
        cookie_store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        refresh_cookie_ttl: Duration,
    ) -> Self {
        Self {
            session,
            local,
            cookies: CookieJar::new(cookie_store, clock),
            refresh_cookie_ttl,
        }
    }

    /// Stored bearer token; empty strings read as absent
    pub fn access_token(&self) -> Option<String> {
        self.session
            .get(ACCESS_TOKEN_KEY)
            .filter(|token| !token.is_empty())
    }

    /// Absolute expiry in epoch milliseconds; unparseable values read as absent
    pub fn access_token_expires_at(&self) -> Option<i64> {
        self.session
            .get(ACCESS_TOKEN_EXPIRES_AT_KEY)
            .and_then(|raw| raw.trim().parse().ok())
    }

    /// Live refresh token from the cookie jar
    pub fn refresh_token(&self) -> Option<String> {
        self.cookies
            .get(REFRESH_TOKEN_COOKIE)
            .filter(|token| !token.is_empty())
    }

    /// Persist a grant exactly as received, overwriting prior values.
    ///
    /// A grant without a refresh token keeps the current cookie.
    pub fn store_grant(&self, grant: &TokenGrant) -> Result<(), StorageError> {
        self.session
            .set(ACCESS_TOKEN_KEY, grant.access_token.clone())?;
        self.session.set(
            ACCESS_TOKEN_EXPIRES_AT_KEY,
            grant.access_token_expires_at.to_string(),
        )?;
        if let Some(refresh_token) = grant
            .refresh_token
            .as_deref()
            .filter(|token| !token.is_empty())
        {
            self.cookies.set(
                REFRESH_TOKEN_COOKIE,
                refresh_token,
                self.refresh_cookie_ttl,
            )?;
        }
        debug!(
            "[Credentials] Stored access token expiring at {} (refresh rotated: {})",
            grant.access_token_expires_at,
            grant.refresh_token.is_some()
        );
        Ok(())
    }

    /// Drop the access token and its expiry, keeping the refresh token
    pub fn clear_access_token(&self) -> Result<(), StorageError> {
        self.session.remove(ACCESS_TOKEN_KEY)?;
        self.session.remove(ACCESS_TOKEN_EXPIRES_AT_KEY)
    }

    /// Drop everything tied to the session: tokens and cached snapshots.
    ///
    /// Every key is attempted even if an earlier removal fails; the first
    /// error is returned.
    pub fn clear_all(&self) -> Result<(), StorageError> {
        let results = [
            self.session.remove(ACCESS_TOKEN_KEY),
            self.session.remove(ACCESS_TOKEN_EXPIRES_AT_KEY),
            self.cookies.remove(REFRESH_TOKEN_COOKIE),
            self.local.remove(USER_KEY),
            self.local.remove(APPLICATION_KEY),
        ];
        let mut first_error = None;
        for result in results {
            if let Err(e) = result {
                warn!("[Credentials] Failed to clear session state: {}", e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Last user snapshot
    pub fn cached_user(&self) -> Option<UserProfile> {
        get_json(self.local.as_ref(), USER_KEY)
    }

    /// Replace the user snapshot
    pub fn store_user(&self, user: &UserProfile) -> Result<(), StorageError> {
        set_json(self.local.as_ref(), USER_KEY, user)
    }

    /// Cached settings, ignoring snapshots from an unknown newer schema
    pub fn cached_settings(&self) -> Option<ApplicationSettings> {
        get_json::<ApplicationSettings>(self.local.as_ref(), APPLICATION_KEY)
            .filter(ApplicationSettings::is_supported)
    }

    /// Replace the settings snapshot
    pub fn store_settings(&self, settings: &ApplicationSettings) -> Result<(), StorageError> {
        set_json(self.local.as_ref(), APPLICATION_KEY, settings)
    }
}
