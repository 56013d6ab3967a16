use log::{debug, warn};
use orchard_model::prelude::*;

use crate::api_client::ApiClient;
use crate::error::ClientResult;
use crate::routes;

impl ApiClient {
    /// Fetch the current user and update the cached snapshot
    pub async fn me(&self) -> ClientResult<UserProfile> {
        let user: UserProfile = self.get(routes::users::ME).await?;
        self.credentials.store_user(&user)?;
        Ok(user)
    }

    /// Update the profile and cache the result
    pub async fn update_profile(&self, update: &ProfileUpdate) -> ClientResult<UserProfile> {
        let user: UserProfile = self.put(routes::users::ME, update).await?;
        self.credentials.store_user(&user)?;
        Ok(user)
    }

    /// Change the password
    pub async fn change_password(&self, change: &PasswordChange) -> ClientResult<()> {
        self.put(routes::users::PASSWORD, change).await
    }

    /// Fetch application settings and update the cached snapshot
    pub async fn settings(&self) -> ClientResult<ApplicationSettings> {
        let settings: ApplicationSettings = self.get(routes::settings::APPLICATION).await?;
        if settings.is_supported() {
            self.credentials.store_settings(&settings)?;
        } else {
            warn!(
                "[ApiClient] Server sent settings version {}, not caching",
                settings.version
            );
        }
        Ok(settings)
    }

    /// Re-read the user snapshot after a balance-changing call.
    ///
    /// The triggering call already succeeded, so failures are only logged.
    pub(crate) async fn refresh_user_snapshot(&self) {
        match self.me().await {
            Ok(user) => debug!("[ApiClient] User snapshot refreshed (balance {})", user.balance),
            Err(e) => warn!("[ApiClient] Failed to refresh user snapshot: {}", e),
        }
    }
}
