//! Authentication controller.
//!
//! Orchestrates password, registration and federated sign-in, persists the
//! resulting session and publishes the current identity to the view layer.
//! Identity is read from the session store once at construction and changes
//! only through the actions here.

mod error;

pub use error::AuthError;

use tokio::sync::{oneshot, watch};
use tracing::{info, instrument};

use atelier_core::ProductId;

use crate::api::{AuthApi, AuthResponse, AuthUser};
use crate::config::FederatedConfig;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::forms::CredentialsForm;
use crate::models::Session;
use crate::services::federated::{FederatedBridge, IdentityProvider, PromptOutcome};
use crate::services::session::SessionStore;

/// Something the user asked the view layer to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Browse,
    AddProduct,
    EditProduct(ProductId),
    DeleteProduct(ProductId),
    /// Open a product's detail page, where it can be bought.
    ViewProduct(ProductId),
}

impl Intent {
    /// Whether the intent needs an active session.
    #[must_use]
    pub const fn requires_session(&self) -> bool {
        !matches!(self, Self::Browse)
    }
}

/// Decision for a gated intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// Carry on with the intent.
    Proceed(Intent),
    /// Show the authentication prompt instead. The intent is dropped; the
    /// user re-invokes it after signing in.
    RequireAuth,
}

/// Current-identity owner for the view layer.
pub struct AuthController<A> {
    api: A,
    sessions: SessionStore,
    current: watch::Sender<Option<AuthUser>>,
}

impl<A: AuthApi> AuthController<A> {
    /// Seed identity from the persisted session.
    #[must_use]
    pub fn new(api: A, sessions: SessionStore) -> Self {
        let current = watch::Sender::new(sessions.current_user());
        Self {
            api,
            sessions,
            current,
        }
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<AuthUser> {
        self.current.borrow().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Receive identity changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.current.subscribe()
    }

    /// Let `intent` through or redirect to authentication.
    #[must_use]
    pub fn gate(&self, intent: Intent) -> Gate {
        if intent.requires_session() && !self.is_authenticated() {
            Gate::RequireAuth
        } else {
            Gate::Proceed(intent)
        }
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` without contacting the API if the form
    /// is invalid, `AuthError::Api` if the API refuses, and
    /// `AuthError::Storage` if the session cannot be persisted.
    #[instrument(skip(self, form))]
    pub async fn login(&self, form: &CredentialsForm) -> Result<AuthUser, AuthError> {
        let (email, password) = form.validate()?;
        let response = self.api.login(email.as_str(), password).await?;
        self.establish(response)
    }

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// Same as [`Self::login`]; a duplicate email surfaces as `AuthError::Api`.
    #[instrument(skip(self, form))]
    pub async fn register(&self, form: &CredentialsForm) -> Result<AuthUser, AuthError> {
        let (email, password) = form.validate()?;
        let response = self.api.register(email.as_str(), password).await?;
        self.establish(response)
    }

    /// Sign in through the federated identity provider.
    ///
    /// The client ID is checked before any network activity. Returns
    /// `Ok(None)` if the user dismissed the provider's prompt.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` for a missing or placeholder client
    /// ID, `AuthError::Bridge` if the provider cannot be loaded, and
    /// `AuthError::Api` if the credential cannot be verified remotely.
    #[instrument(skip_all)]
    pub async fn federated_login<P: IdentityProvider>(
        &self,
        bridge: &mut FederatedBridge<P>,
        config: &FederatedConfig,
    ) -> Result<Option<AuthUser>, AuthError> {
        let client_id = config.client_id()?;

        bridge.load_script().await?;

        let (tx, rx) = oneshot::channel();
        bridge.initialize(client_id, move |credential| {
            let _ = tx.send(credential);
        })?;

        match bridge.prompt().await? {
            PromptOutcome::Delivered => {
                let credential = rx.await.map_err(|_| AuthError::CredentialLost)?;
                let response = self.api.federated_login(credential.as_str()).await?;
                self.establish(response).map(Some)
            }
            PromptOutcome::Dismissed | PromptOutcome::NotInitialized => Ok(None),
        }
    }

    /// Sign out locally. No remote endpoint is called.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the persisted session cannot be
    /// removed; the in-memory identity is then left untouched as well.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.sessions.clear()?;
        self.current.send_replace(None);
        clear_sentry_user();
        info!("Signed out");
        Ok(())
    }

    fn establish(&self, response: AuthResponse) -> Result<AuthUser, AuthError> {
        let session = Session::from(response);
        self.sessions.persist(&session)?;

        let user = session.user;
        set_sentry_user(&user.id, Some(user.email.as_str()));
        info!(user_id = %user.id, "Signed in");
        self.current.send_replace(Some(user.clone()));
        Ok(user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use url::Url;

    use atelier_core::{Email, UserId};

    use super::*;
    use crate::api::ApiError;
    use crate::services::federated::tests::FakeProvider;
    use crate::services::federated::BridgeState;
    use crate::services::session::MemoryStorage;

    /// Accepts one email/password pair and one federated credential.
    #[derive(Default)]
    struct FakeAuthApi {
        calls: AtomicUsize,
    }

    fn response(email: &str) -> AuthResponse {
        AuthResponse {
            token: format!("token-for-{email}"),
            user: AuthUser {
                id: UserId::new("u-1"),
                email: Email::parse(email).unwrap(),
            },
        }
    }

    #[async_trait]
    impl AuthApi for FakeAuthApi {
        async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if email == "shopper@atelier.vn" && password == "secret1" {
                Ok(response(email))
            } else {
                Err(ApiError::Unauthorized(Some("Invalid credentials".into())))
            }
        }

        async fn register(&self, email: &str, _password: &str) -> Result<AuthResponse, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if email == "taken@atelier.vn" {
                Err(ApiError::Validation(Some("Email already registered".into())))
            } else {
                Ok(response(email))
            }
        }

        async fn federated_login(&self, credential: &str) -> Result<AuthResponse, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if credential == "google-cred" {
                Ok(response("g@atelier.vn"))
            } else {
                Err(ApiError::Unauthorized(None))
            }
        }
    }

    fn controller() -> (AuthController<FakeAuthApi>, SessionStore) {
        let sessions = SessionStore::new(MemoryStorage::default());
        (
            AuthController::new(FakeAuthApi::default(), sessions.clone()),
            sessions,
        )
    }

    fn federated(client_id: Option<&str>) -> FederatedConfig {
        FederatedConfig {
            client_id: client_id.map(String::from),
            script_url: Url::parse("https://accounts.google.com/gsi/client").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_login_persists_and_notifies() {
        let (auth, sessions) = controller();
        let mut rx = auth.subscribe();
        assert!(!auth.is_authenticated());

        let user = auth
            .login(&CredentialsForm::new(" shopper@atelier.vn ", "secret1"))
            .await
            .unwrap();

        assert_eq!(user.email.as_str(), "shopper@atelier.vn");
        assert_eq!(sessions.current_user(), Some(user.clone()));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().clone(), Some(user));
    }

    #[tokio::test]
    async fn test_login_rejected_leaves_user_logged_out() {
        let (auth, sessions) = controller();
        let err = auth
            .login(&CredentialsForm::new("shopper@atelier.vn", "wrong-pass"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Api(ApiError::Unauthorized(_))));
        assert!(!auth.is_authenticated());
        assert_eq!(sessions.current_user(), None);
    }

    #[tokio::test]
    async fn test_invalid_form_never_calls_api() {
        let (auth, _) = controller();
        let err = auth
            .register(&CredentialsForm::new("not-an-email", "123"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(auth.api.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let (auth, _) = controller();
        let err = auth
            .register(&CredentialsForm::new("taken@atelier.vn", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Api(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_logout_clears_both_copies() {
        let (auth, sessions) = controller();
        auth.register(&CredentialsForm::new("new@atelier.vn", "secret1"))
            .await
            .unwrap();

        auth.logout().unwrap();

        assert_eq!(auth.current_user(), None);
        assert_eq!(sessions.current_user(), None);
        assert!(sessions.token().is_none());
    }

    #[tokio::test]
    async fn test_identity_seeded_from_storage() {
        let sessions = SessionStore::new(MemoryStorage::default());
        sessions
            .persist(&Session::from(response("back@atelier.vn")))
            .unwrap();

        let auth = AuthController::new(FakeAuthApi::default(), sessions);
        assert_eq!(
            auth.current_user().map(|u| u.email.into_inner()),
            Some("back@atelier.vn".to_string())
        );
    }

    #[test]
    fn test_gate_without_session() {
        let (auth, _) = controller();
        assert_eq!(auth.gate(Intent::AddProduct), Gate::RequireAuth);
        assert_eq!(
            auth.gate(Intent::DeleteProduct("1".into())),
            Gate::RequireAuth
        );
        assert_eq!(
            auth.gate(Intent::ViewProduct("1".into())),
            Gate::RequireAuth
        );
        assert_eq!(auth.gate(Intent::Browse), Gate::Proceed(Intent::Browse));
    }

    #[tokio::test]
    async fn test_gate_with_session() {
        let (auth, _) = controller();
        auth.login(&CredentialsForm::new("shopper@atelier.vn", "secret1"))
            .await
            .unwrap();
        assert_eq!(
            auth.gate(Intent::EditProduct("1".into())),
            Gate::Proceed(Intent::EditProduct("1".into()))
        );
    }

    #[tokio::test]
    async fn test_federated_missing_client_id_skips_network() {
        let (auth, _) = controller();
        let mut bridge = FederatedBridge::new(FakeProvider::default());

        let err = auth
            .federated_login(&mut bridge, &federated(Some("your_google_client_id_here")))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Configuration(_)));
        assert_eq!(bridge.state(), BridgeState::Unloaded);
    }

    #[tokio::test]
    async fn test_federated_success() {
        let (auth, sessions) = controller();
        let mut bridge = FederatedBridge::new(FakeProvider {
            credential: Some("google-cred".into()),
            ..FakeProvider::default()
        });

        let user = auth
            .federated_login(&mut bridge, &federated(Some("1234.apps.googleusercontent.com")))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(user.email.as_str(), "g@atelier.vn");
        assert_eq!(bridge.state(), BridgeState::Succeeded);
        assert!(sessions.token().is_some());
    }

    #[tokio::test]
    async fn test_federated_dismissed() {
        let (auth, _) = controller();
        let mut bridge = FederatedBridge::new(FakeProvider::default());

        let outcome = auth
            .federated_login(&mut bridge, &federated(Some("1234.apps.googleusercontent.com")))
            .await
            .unwrap();

        assert_eq!(outcome, None);
        assert_eq!(bridge.state(), BridgeState::Dismissed);
        assert!(!auth.is_authenticated());
    }
}
