//! Access-token lifecycle
//!
//! [`TokenLifecycle`] decides when the access token must be renewed and
//! performs the renewal against `/refresh`. Renewals are funnelled through a
//! [`SingleFlight`], so however many requests notice an expiring token at the
//! same moment, one `/refresh` call is made and every caller sees its outcome.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use orchard_model::{RefreshRequest, TokenGrant};
use reqwest::Client;

use crate::api_client::{build_url, read_failure};
use crate::auth::credentials::Credentials;
use crate::clock::Clock;
use crate::error::{ClientError, ClientResult};
use crate::routes;
use crate::single_flight::{Role, SingleFlight};

/// Result of inspecting stored tokens without touching the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    /// Access token usable as-is
    Valid(String),
    /// Access token missing or inside the expiry buffer, refresh token held
    NeedsRefresh,
}

/// Decides when to renew and performs renewals; clones share state
#[derive(Clone, Debug)]
pub struct TokenLifecycle {
    http: Client,
    base_url: Arc<str>,
    credentials: Credentials,
    clock: Arc<dyn Clock>,
    refresh_buffer: Duration,
    flight: SingleFlight<ClientResult<()>>,
}

impl TokenLifecycle {
    /// Lifecycle over `credentials`, renewing `refresh_buffer` before expiry
    pub fn new(
        http: Client,
        base_url: Arc<str>,
        credentials: Credentials,
        clock: Arc<dyn Clock>,
        refresh_buffer: Duration,
    ) -> Self {
        Self {
            http,
            base_url,
            credentials,
            clock,
            refresh_buffer,
            flight: SingleFlight::new(),
        }
    }

    /// Underlying token storage
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// True while a `/refresh` call is in flight
    pub fn is_refreshing(&self) -> bool {
        self.flight.is_in_flight()
    }

    /// Whether a token expiring at `expires_at` must be renewed now.
    ///
    /// An unknown expiry is treated as expiring.
    pub fn is_expiring(&self, expires_at: Option<i64>) -> bool {
        let Some(expires_at) = expires_at else {
            return true;
        };
        let buffer = i64::try_from(self.refresh_buffer.as_millis()).unwrap_or(i64::MAX);
        expires_at.saturating_sub(buffer) <= self.clock.now_millis()
    }

    /// Inspect stored tokens.
    ///
    /// Fails with [`ClientError::NoRefreshToken`] when no token is stored (any
    /// leftover snapshots are dropped), and
    /// with [`ClientError::TokenExpiredNoRefresh`] (after discarding the stale
    /// access token) when the access token is expiring and cannot be renewed.
    pub fn status(&self) -> ClientResult<TokenStatus> {
        let has_refresh = self.credentials.refresh_token().is_some();

        let Some(access_token) = self.credentials.access_token() else {
            if has_refresh {
                return Ok(TokenStatus::NeedsRefresh);
            }
            self.discard_session();
            return Err(ClientError::NoRefreshToken);
        };

        if !self.is_expiring(self.credentials.access_token_expires_at()) {
            return Ok(TokenStatus::Valid(access_token));
        }

        if has_refresh {
            return Ok(TokenStatus::NeedsRefresh);
        }

        warn!("[TokenLifecycle] Access token expired and no refresh token is stored");
        if let Err(e) = self.credentials.clear_access_token() {
            warn!("[TokenLifecycle] Failed to discard expired access token: {}", e);
        }
        Err(ClientError::TokenExpiredNoRefresh)
    }

    /// Return a usable access token, renewing it first if needed.
    ///
    /// Concurrent callers that all need a renewal share a single `/refresh`
    /// call and observe the same result.
    pub async fn ensure_token_valid(&self) -> ClientResult<String> {
        if let TokenStatus::Valid(token) = self.status()? {
            return Ok(token);
        }

        self.shared_refresh(None).await?;

        self.credentials.access_token().ok_or_else(|| {
            ClientError::RefreshRejected("refresh did not yield an access token".into())
        })
    }

    /// Renew after the server rejected `rejected_token`.
    ///
    /// Joins a refresh already in flight. If another caller has already
    /// replaced the rejected token, no network call is made.
    pub async fn refresh_after_rejection(&self, rejected_token: &str) -> ClientResult<()> {
        self.shared_refresh(Some(rejected_token)).await
    }

    async fn shared_refresh(&self, rejected_token: Option<&str>) -> ClientResult<()> {
        let (outcome, role) = self
            .flight
            .run_with_role(|| async move {
                if self.already_renewed(rejected_token) {
                    debug!("[TokenLifecycle] Token already renewed by an earlier flight");
                    return Ok(());
                }
                self.refresh_tokens().await
            })
            .await
            .map_err(|_| ClientError::RefreshAbandoned)?;

        if role == Role::Follower {
            debug!(
                "[TokenLifecycle] Joined in-flight refresh (ok: {})",
                outcome.is_ok()
            );
        }
        outcome
    }

    /// Skip the network when a previous flight already did the work
    fn already_renewed(&self, rejected_token: Option<&str>) -> bool {
        let Some(current) = self.credentials.access_token() else {
            return false;
        };
        match rejected_token {
            Some(rejected) => current != rejected,
            None => !self.is_expiring(self.credentials.access_token_expires_at()),
        }
    }

    /// Exchange the stored refresh token for a new grant.
    ///
    /// Callers normally go through [`ensure_token_valid`](Self::ensure_token_valid);
    /// calling this directly bypasses single-flight de-duplication.
    pub async fn refresh_tokens(&self) -> ClientResult<()> {
        let Some(refresh_token) = self.credentials.refresh_token() else {
            self.discard_session();
            return Err(ClientError::NoRefreshToken);
        };

        info!("[TokenLifecycle] Attempting to refresh access token");

        let url = build_url(&self.base_url, routes::auth::REFRESH);
        let response = self
            .http
            .post(&url)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(|e| {
                warn!("[TokenLifecycle] Refresh request failed to send: {}", e);
                ClientError::from(e)
            })?;

        if !response.status().is_success() {
            let failure = read_failure(response).await;
            warn!(
                "[TokenLifecycle] Refresh rejected with status {}: {}",
                failure.status,
                failure.message()
            );
            self.discard_session();
            return Err(ClientError::RefreshRejected(failure.message().to_string()));
        }

        let grant: TokenGrant = response.json().await.map_err(|e| {
            warn!("[TokenLifecycle] Undecodable refresh response: {}", e);
            ClientError::InvalidResponse(e.to_string())
        })?;

        if !grant.is_usable() {
            warn!("[TokenLifecycle] Refresh response carried no access token");
            self.discard_session();
            return Err(ClientError::RefreshRejected(
                "refresh response did not include an access token".into(),
            ));
        }

        self.credentials.store_grant(&grant)?;
        info!("[TokenLifecycle] Successfully refreshed access token");
        Ok(())
    }

    fn discard_session(&self) {
        if let Err(e) = self.credentials.clear_all() {
            warn!("[TokenLifecycle] Failed to clear session state: {}", e);
        }
    }
}
