//! Federated identity bridge.
//!
//! Drives a third-party sign-in SDK through explicit states:
//!
//! ```text
//! Unloaded -> Loading -> Ready -> Prompted -> Succeeded
//!                 |                      \-> Dismissed
//!                 \-> Unloaded (load failed)
//! ```
//!
//! The provider's consent flow is external; the bridge only loads the SDK,
//! registers a one-shot credential callback and asks the provider to prompt.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Errors raised by the bridge or its provider.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The provider SDK could not be fetched.
    #[error("failed to load identity provider script: {0}")]
    ScriptLoad(String),

    /// `initialize` was called before the SDK finished loading.
    #[error("identity provider script is not loaded")]
    NotLoaded,

    /// The provider failed while prompting.
    #[error("identity provider error: {0}")]
    Provider(String),
}

/// Where the bridge is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Unloaded,
    Loading,
    Ready,
    Prompted,
    Succeeded,
    Dismissed,
}

impl BridgeState {
    /// Whether the SDK is available.
    #[must_use]
    pub const fn is_loaded(self) -> bool {
        matches!(
            self,
            Self::Ready | Self::Prompted | Self::Succeeded | Self::Dismissed
        )
    }
}

/// A credential issued by the identity provider, to be exchanged for a session.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderCredential(String);

impl ProviderCredential {
    #[must_use]
    pub fn new(credential: impl Into<String>) -> Self {
        Self(credential.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ProviderCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ProviderCredential([REDACTED])")
    }
}

/// Result of [`FederatedBridge::prompt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptOutcome {
    /// A credential was handed to the registered callback.
    Delivered,
    /// The user closed the provider's affordance.
    Dismissed,
    /// No callback was registered, so nothing happened.
    NotInitialized,
}

/// The third-party sign-in SDK.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Fetch and evaluate the SDK.
    async fn load_script(&self) -> Result<(), BridgeError>;

    /// Show the sign-in affordance; `None` when the user dismisses it.
    async fn request_credential(
        &self,
        client_id: &str,
    ) -> Result<Option<ProviderCredential>, BridgeError>;
}

type CredentialCallback = Box<dyn FnOnce(ProviderCredential) + Send>;

struct Registration {
    client_id: String,
    on_credential: CredentialCallback,
}

/// State machine around an [`IdentityProvider`].
pub struct FederatedBridge<P> {
    provider: P,
    state: BridgeState,
    registration: Option<Registration>,
}

impl<P: IdentityProvider> FederatedBridge<P> {
    #[must_use]
    pub const fn new(provider: P) -> Self {
        Self {
            provider,
            state: BridgeState::Unloaded,
            registration: None,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> BridgeState {
        self.state
    }

    /// Load the SDK. Resolves immediately when it is already loaded.
    ///
    /// A failed load is not retried and leaves the bridge `Unloaded`.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::ScriptLoad` if the provider cannot be fetched.
    #[instrument(skip(self))]
    pub async fn load_script(&mut self) -> Result<(), BridgeError> {
        if self.state.is_loaded() {
            return Ok(());
        }

        self.state = BridgeState::Loading;
        match self.provider.load_script().await {
            Ok(()) => {
                self.state = BridgeState::Ready;
                debug!("Identity provider script loaded");
                Ok(())
            }
            Err(e) => {
                self.state = BridgeState::Unloaded;
                warn!(error = %e, "Identity provider script failed to load");
                Err(e)
            }
        }
    }

    /// Register the one-shot callback that receives the next credential.
    ///
    /// Re-initializing replaces a previous registration and returns the
    /// bridge to `Ready`.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::NotLoaded` if the SDK is not loaded.
    pub fn initialize<F>(&mut self, client_id: &str, on_credential: F) -> Result<(), BridgeError>
    where
        F: FnOnce(ProviderCredential) + Send + 'static,
    {
        if !self.state.is_loaded() {
            return Err(BridgeError::NotLoaded);
        }

        self.registration = Some(Registration {
            client_id: client_id.to_string(),
            on_credential: Box::new(on_credential),
        });
        self.state = BridgeState::Ready;
        Ok(())
    }

    /// Ask the provider to show its sign-in affordance.
    ///
    /// Has no effect without a registered callback. The callback is consumed
    /// when a credential is delivered.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Provider` if the provider fails; the
    /// registration is kept so the prompt can be retried.
    #[instrument(skip(self))]
    pub async fn prompt(&mut self) -> Result<PromptOutcome, BridgeError> {
        let Some(registration) = self.registration.take() else {
            return Ok(PromptOutcome::NotInitialized);
        };

        self.state = BridgeState::Prompted;
        match self
            .provider
            .request_credential(&registration.client_id)
            .await
        {
            Ok(Some(credential)) => {
                self.state = BridgeState::Succeeded;
                info!("Identity provider returned a credential");
                (registration.on_credential)(credential);
                Ok(PromptOutcome::Delivered)
            }
            Ok(None) => {
                self.state = BridgeState::Dismissed;
                self.registration = Some(registration);
                Ok(PromptOutcome::Dismissed)
            }
            Err(e) => {
                self.state = BridgeState::Ready;
                self.registration = Some(registration);
                Err(e)
            }
        }
    }
}

// =============================================================================
// Google Identity Services
// =============================================================================

/// Source of the credential once the provider's consent flow completes.
#[async_trait]
pub trait CredentialPrompt: Send + Sync {
    /// Obtain a credential for `client_id`; `None` if the user gave up.
    async fn ask(&self, client_id: &str) -> Result<Option<String>, BridgeError>;
}

/// Google Identity Services provider.
///
/// Loading fetches the GSI client script; the consent flow itself happens
/// outside the process and its credential arrives through a [`CredentialPrompt`].
pub struct GoogleIdentityServices<C> {
    http: reqwest::Client,
    script_url: Url,
    prompt: C,
}

impl<C: CredentialPrompt> GoogleIdentityServices<C> {
    #[must_use]
    pub const fn new(http: reqwest::Client, script_url: Url, prompt: C) -> Self {
        Self {
            http,
            script_url,
            prompt,
        }
    }
}

#[async_trait]
impl<C: CredentialPrompt> IdentityProvider for GoogleIdentityServices<C> {
    async fn load_script(&self) -> Result<(), BridgeError> {
        let response = self
            .http
            .get(self.script_url.clone())
            .send()
            .await
            .map_err(|e| BridgeError::ScriptLoad(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BridgeError::ScriptLoad(format!(
                "HTTP {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn request_credential(
        &self,
        client_id: &str,
    ) -> Result<Option<ProviderCredential>, BridgeError> {
        let credential = self.prompt.ask(client_id).await?;
        Ok(credential
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .map(ProviderCredential::new))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::*;

    /// Scripted provider for tests.
    #[derive(Default)]
    pub struct FakeProvider {
        pub fail_load: bool,
        pub credential: Option<String>,
        pub loads: AtomicUsize,
        pub prompts: AtomicUsize,
    }

    #[async_trait]
    impl IdentityProvider for FakeProvider {
        async fn load_script(&self) -> Result<(), BridgeError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if self.fail_load {
                Err(BridgeError::ScriptLoad("offline".into()))
            } else {
                Ok(())
            }
        }

        async fn request_credential(
            &self,
            _client_id: &str,
        ) -> Result<Option<ProviderCredential>, BridgeError> {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            Ok(self.credential.clone().map(ProviderCredential::new))
        }
    }

    fn provider(credential: Option<&str>) -> FakeProvider {
        FakeProvider {
            credential: credential.map(String::from),
            ..FakeProvider::default()
        }
    }

    #[tokio::test]
    async fn test_load_is_idempotent() {
        let mut bridge = FederatedBridge::new(provider(None));
        assert_eq!(bridge.state(), BridgeState::Unloaded);

        bridge.load_script().await.unwrap();
        bridge.load_script().await.unwrap();

        assert_eq!(bridge.state(), BridgeState::Ready);
        assert_eq!(bridge.provider.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_load_stays_unloaded() {
        let mut bridge = FederatedBridge::new(FakeProvider {
            fail_load: true,
            ..FakeProvider::default()
        });
        assert!(matches!(
            bridge.load_script().await,
            Err(BridgeError::ScriptLoad(_))
        ));
        assert_eq!(bridge.state(), BridgeState::Unloaded);
    }

    #[test]
    fn test_initialize_before_load_fails() {
        let mut bridge = FederatedBridge::new(provider(None));
        assert!(matches!(
            bridge.initialize("client", |_| {}),
            Err(BridgeError::NotLoaded)
        ));
    }

    #[tokio::test]
    async fn test_prompt_without_initialize_is_noop() {
        let mut bridge = FederatedBridge::new(provider(Some("cred")));
        bridge.load_script().await.unwrap();

        assert_eq!(bridge.prompt().await.unwrap(), PromptOutcome::NotInitialized);
        assert_eq!(bridge.state(), BridgeState::Ready);
        assert_eq!(bridge.provider.prompts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_prompt_delivers_once() {
        let mut bridge = FederatedBridge::new(provider(Some("cred-123")));
        bridge.load_script().await.unwrap();

        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);
        bridge
            .initialize("client", move |c| sink.lock().push(c.as_str().to_string()))
            .unwrap();

        assert_eq!(bridge.prompt().await.unwrap(), PromptOutcome::Delivered);
        assert_eq!(bridge.state(), BridgeState::Succeeded);
        assert_eq!(bridge.prompt().await.unwrap(), PromptOutcome::NotInitialized);
        assert_eq!(*received.lock(), vec!["cred-123".to_string()]);
    }

    #[tokio::test]
    async fn test_prompt_dismissed_keeps_registration() {
        let mut bridge = FederatedBridge::new(provider(None));
        bridge.load_script().await.unwrap();
        bridge.initialize("client", |_| {}).unwrap();

        assert_eq!(bridge.prompt().await.unwrap(), PromptOutcome::Dismissed);
        assert_eq!(bridge.state(), BridgeState::Dismissed);
        assert_eq!(bridge.prompt().await.unwrap(), PromptOutcome::Dismissed);
        assert_eq!(bridge.provider.prompts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let debug = format!("{:?}", ProviderCredential::new("eyJraWQ"));
        assert!(!debug.contains("eyJraWQ"));
    }
}
