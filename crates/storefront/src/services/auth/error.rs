//! Authentication error types.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::forms::ValidationErrors;
use crate::services::federated::BridgeError;
use crate::services::session::StorageError;

/// Errors that can occur during authentication flows.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The form failed client-side validation; nothing was sent.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    /// The API rejected or failed the request.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Federated sign-in is not configured.
    #[error("federated sign-in is not configured: {0}")]
    Configuration(#[from] ConfigError),

    /// The identity provider bridge failed.
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    /// The identity provider went away before delivering a credential.
    #[error("identity provider did not deliver a credential")]
    CredentialLost,

    /// The session could not be written or removed.
    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),
}
