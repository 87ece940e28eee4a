//! Application startup.
//!
//! Builds the token storage, HTTP transport, API client and auth store from
//! configuration and hands them out as one [`AppState`].

use std::sync::Arc;

use tracing::info;

use crate::api::ApiClient;
use crate::config::ConfigV1;
use crate::error::BoxError;
use crate::session::AuthStore;
use crate::state::AppState;
use crate::storage::create_storage;
use crate::transport::ReqwestTransport;

/// Wire up the application. Nothing is read from storage yet; call
/// [`AppState::restore`] once the state is built.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be constructed.
pub fn build_state(config: ConfigV1) -> Result<AppState, BoxError> {
    let config = Arc::new(config);
    let storage = create_storage(&config.storage);
    let transport = Arc::new(ReqwestTransport::new(&config.api)?);

    info!(
        "Using API at {} with {} token storage",
        config.api.base_url,
        storage.get_name()
    );

    let api = ApiClient::from_config(&config.api, transport, storage.clone());
    let session = AuthStore::new(storage.clone());

    Ok(AppState {
        config,
        storage,
        api,
        session,
    })
}
