use log::{info, warn};
use orchard_model::{
    ApplicationSettings, AuthPayload, LoginRequest, LogoutRequest, RegisterRequest, UserProfile,
};

use crate::api_client::{ApiClient, RequestOptions};
use crate::error::{ClientError, ClientResult};
use crate::routes;

impl ApiClient {
    /// Authenticate and persist the returned tokens and snapshots
    pub async fn login(&self, request: &LoginRequest) -> ClientResult<AuthPayload> {
        info!("[ApiClient] Logging in as {}", request.identifier);
        let payload: AuthPayload = self
            .public_request(routes::auth::LOGIN, RequestOptions::post(request)?)
            .await?;
        self.persist_auth_payload(&payload)?;
        info!("[ApiClient] Login succeeded");
        Ok(payload)
    }

    /// Create an account; the server logs the new user in directly
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<AuthPayload> {
        info!("[ApiClient] Registering {}", request.username);
        let payload: AuthPayload = self
            .public_request(routes::auth::REGISTER, RequestOptions::post(request)?)
            .await?;
        self.persist_auth_payload(&payload)?;
        Ok(payload)
    }

    fn persist_auth_payload(&self, payload: &AuthPayload) -> ClientResult<()> {
        if !payload.grant.is_usable() {
            return Err(ClientError::InvalidResponse(
                "authentication response did not include an access token".into(),
            ));
        }
        self.credentials.store_grant(&payload.grant)?;
        if let Some(user) = &payload.user {
            self.credentials.store_user(user)?;
        }
        if let Some(settings) = &payload.application {
            self.credentials.store_settings(settings)?;
        }
        Ok(())
    }

    /// Invalidate the refresh token server-side, then forget everything.
    ///
    /// The server call is best effort; local state is cleared regardless.
    pub async fn logout_user(&self) -> ClientResult<()> {
        if let Some(refresh_token) = self.credentials.refresh_token() {
            let body = LogoutRequest { refresh_token };
            let outcome = match RequestOptions::post(&body) {
                Ok(options) => {
                    self.public_request::<serde_json::Value>(routes::auth::LOGOUT, options)
                        .await
                }
                Err(e) => Err(e),
            };
            if let Err(e) = outcome {
                warn!("[ApiClient] Server logout failed, clearing local session anyway: {}", e);
            }
        }

        self.credentials.clear_all()?;
        info!("[ApiClient] Logged out");
        Ok(())
    }

    /// An unexpired access token or a refresh token is held
    pub fn is_authenticated(&self) -> bool {
        let access_valid = self.credentials.access_token().is_some()
            && !self
                .lifecycle
                .is_expiring(self.credentials.access_token_expires_at());
        access_valid || self.credentials.refresh_token().is_some()
    }

    /// Last user snapshot, without a network call
    pub fn cached_user(&self) -> Option<UserProfile> {
        self.credentials.cached_user()
    }

    /// Last settings snapshot, without a network call
    pub fn cached_settings(&self) -> Option<ApplicationSettings> {
        self.credentials.cached_settings()
    }
}
