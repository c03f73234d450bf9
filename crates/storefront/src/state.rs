//! Application state shared across the view layer.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::StorefrontConfig;
use crate::error::AppError;
use crate::services::auth::AuthController;
use crate::services::federated::{CredentialPrompt, FederatedBridge, GoogleIdentityServices};
use crate::services::session::{FileStorage, SessionStorage, SessionStore};

/// Application state shared across all commands.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the configuration, the API client and the session store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    sessions: SessionStore,
    api: ApiClient,
}

impl AppState {
    /// Create state with the session persisted under `config.state_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, AppError> {
        let storage = FileStorage::in_dir(&config.state_dir);
        Self::with_storage(config, storage)
    }

    /// Create state over a specific session backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_storage(
        config: StorefrontConfig,
        storage: impl SessionStorage + 'static,
    ) -> Result<Self, AppError> {
        let sessions = SessionStore::new(storage);
        let api = ApiClient::new(&config, sessions.clone())?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                sessions,
                api,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    /// An auth controller seeded from the persisted session.
    #[must_use]
    pub fn auth(&self) -> AuthController<ApiClient> {
        AuthController::new(self.inner.api.clone(), self.inner.sessions.clone())
    }

    /// A Google Identity Services bridge whose credential comes from `prompt`.
    #[must_use]
    pub fn federated_bridge<C: CredentialPrompt>(
        &self,
        prompt: C,
    ) -> FederatedBridge<GoogleIdentityServices<C>> {
        FederatedBridge::new(GoogleIdentityServices::new(
            self.inner.api.http().clone(),
            self.inner.config.federated.script_url.clone(),
            prompt,
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use atelier_core::{Email, UserId};

    use super::*;
    use crate::api::AuthUser;
    use crate::models::Session;
    use crate::services::session::MemoryStorage;

    #[test]
    fn test_auth_seeded_from_file_storage() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorefrontConfig::for_api("http://localhost:4000/api", dir.path()).unwrap();

        let first = AppState::new(config.clone()).unwrap();
        assert!(!first.auth().is_authenticated());
        first
            .sessions()
            .persist(&Session::new(
                "tok",
                AuthUser {
                    id: UserId::new("u-1"),
                    email: Email::parse("a@b.vn").unwrap(),
                },
            ))
            .unwrap();

        let restarted = AppState::new(config).unwrap();
        assert!(restarted.auth().is_authenticated());
    }

    #[test]
    fn test_clones_share_sessions() {
        let config = StorefrontConfig::for_api("http://localhost:4000/api", "/unused").unwrap();
        let state = AppState::with_storage(config, MemoryStorage::default()).unwrap();
        let clone = state.clone();
        assert!(Arc::ptr_eq(&state.inner, &clone.inner));
    }
}
