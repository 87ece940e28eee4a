//! Shared application state.
//!
//! The application root owns one API client and one auth store, both wired to
//! the same token storage. The sign-in helpers below are the only place the
//! two are used together.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::api::ApiClient;
use crate::config::ConfigV1;
use crate::error::ApiError;
use crate::models::{LoginRequest, User};
use crate::session::AuthStore;
use crate::storage::TokenStorage;

#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Durable token storage shared by `api` (reader) and `session` (writer).
    pub storage: Arc<dyn TokenStorage>,
    pub api: ApiClient,
    pub session: AuthStore,
}

impl AppState {
    /// Log in, persist the token, then fetch and attach the account record.
    ///
    /// If the freshly issued token is rejected by `/auth/me` the session is
    /// cleared again before the error is returned.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let credentials = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let token = self.api.login(&credentials).await?;
        self.session.login(token.access_token, None)?;

        match self.api.get_me().await {
            Ok(user) => {
                info!("Signed in as '{}' ({})", user.email, user.role);
                self.session.set_user(user.clone());
                Ok(user)
            }
            Err(e) => {
                if e.is_unauthorized() {
                    if let Err(clear_err) = self.session.logout() {
                        error!("Failed to clear rejected token: {}", clear_err);
                    }
                }
                Err(e)
            }
        }
    }

    /// Rehydrate the session from storage at startup.
    ///
    /// Returns `Ok(None)` when there is no stored token or the server no longer
    /// accepts it; in the latter case the stale token is erased.
    pub async fn restore(&self) -> Result<Option<User>, ApiError> {
        if self.session.init()?.is_none() {
            return Ok(None);
        }
        match self.api.get_me().await {
            Ok(user) => {
                self.session.set_user(user.clone());
                Ok(Some(user))
            }
            Err(e) if e.is_unauthorized() => {
                warn!("Stored token was rejected: {}", e);
                self.session.logout()?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub fn sign_out(&self) -> Result<(), ApiError> {
        self.session.logout()?;
        Ok(())
    }
}
