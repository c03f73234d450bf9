//! Unified error handling with Sentry integration.
//!
//! Every layer has its own error enum; `AppError` gathers them at the view
//! layer, classifies them into an [`ErrorKind`] and turns them into a
//! user-facing [`Notification`]. Nothing here is fatal: the view reports the
//! error and returns to its pre-action state.

use std::fmt;

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::forms::ValidationErrors;
use crate::services::auth::AuthError;
use crate::services::federated::BridgeError;
use crate::services::session::StorageError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A product API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Sign-in, registration or logout failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Local session storage failed.
    #[error("Session storage error: {0}")]
    Storage(#[from] StorageError),

    /// The identity provider failed outside a sign-in attempt.
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    /// Form input was rejected before submission.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    /// A gated action was attempted without a session.
    #[error("Sign in to continue")]
    AuthRequired,
}

/// Error classes the view layer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Shown inline next to the offending field.
    Validation,
    Unauthorized,
    NotFound,
    /// Transport failure.
    Network,
    /// Unrecognized remote error or local failure.
    Unknown,
    /// Federated sign-in or other setup is missing.
    Configuration,
}

const fn api_kind(err: &ApiError) -> ErrorKind {
    match err {
        ApiError::Validation(_) => ErrorKind::Validation,
        ApiError::Unauthorized(_) => ErrorKind::Unauthorized,
        ApiError::NotFound(_) => ErrorKind::NotFound,
        ApiError::Network(_) => ErrorKind::Network,
        ApiError::Unknown { .. } | ApiError::Decode(_) => ErrorKind::Unknown,
    }
}

impl AppError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_)
            | Self::Auth(
                AuthError::Configuration(_) | AuthError::Bridge(BridgeError::NotLoaded),
            )
            | Self::Bridge(BridgeError::NotLoaded) => ErrorKind::Configuration,
            Self::Api(e) | Self::Auth(AuthError::Api(e)) => api_kind(e),
            Self::Validation(_) | Self::Auth(AuthError::Validation(_)) => ErrorKind::Validation,
            Self::Bridge(_) | Self::Auth(AuthError::Bridge(_)) => ErrorKind::Network,
            Self::AuthRequired => ErrorKind::Unauthorized,
            Self::Storage(_) | Self::Auth(AuthError::Storage(_) | AuthError::CredentialLost) => {
                ErrorKind::Unknown
            }
        }
    }

    /// Message the remote API attached to its error response, if any.
    #[must_use]
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::Api(e) | Self::Auth(AuthError::Api(e)) => e.remote_message(),
            _ => None,
        }
    }

    /// Per-field messages, for errors shown inline.
    #[must_use]
    pub const fn field_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(e) | Self::Auth(AuthError::Validation(e)) => Some(e),
            _ => None,
        }
    }

    /// User-facing notification for a failed `operation`.
    ///
    /// Uses the remote message when the API sent one, otherwise a generic
    /// message for the operation.
    #[must_use]
    pub fn notification(&self, operation: Operation) -> Notification {
        let description = match (self.kind(), self.field_errors()) {
            (_, Some(fields)) => fields.to_string(),
            (ErrorKind::Configuration, _)
                if operation == Operation::FederatedLogin
                    && matches!(self, Self::Auth(AuthError::Configuration(_))) =>
            {
                return Notification::error(
                    "Configuration error",
                    "The Google client ID is not configured correctly",
                );
            }
            (ErrorKind::Configuration, _) => self.to_string(),
            (ErrorKind::Unauthorized, _) if matches!(self, Self::AuthRequired) => {
                return Notification::error("Sign-in required", operation.sign_in_prompt());
            }
            _ => self
                .remote_message()
                .map_or_else(|| operation.fallback().to_string(), String::from),
        };
        Notification::error(operation.failure_title(), description)
    }

    /// Log the error, send unexpected ones to Sentry, and build the notification.
    #[must_use]
    pub fn report(&self, operation: Operation) -> Notification {
        if matches!(self.kind(), ErrorKind::Unknown | ErrorKind::Network) {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                operation = %operation,
                sentry_event_id = %event_id,
                "Operation failed"
            );
        } else {
            tracing::warn!(error = %self, operation = %operation, "Operation failed");
        }
        self.notification(operation)
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

// =============================================================================
// Notifications
// =============================================================================

/// A user-initiated action that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    LoadCatalog,
    LoadProduct,
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
    Login,
    Register,
    FederatedLogin,
    Logout,
}

impl Operation {
    const fn failure_title(self) -> &'static str {
        match self {
            Self::Login => "Login failed",
            Self::Register => "Sign-up failed",
            Self::FederatedLogin => "Google sign-in failed",
            _ => "Error",
        }
    }

    const fn fallback(self) -> &'static str {
        match self {
            Self::LoadCatalog => "Could not load the product list",
            Self::LoadProduct => "Could not load product details",
            Self::CreateProduct | Self::UpdateProduct => "Could not save the product",
            Self::DeleteProduct => "Could not delete the product",
            Self::Login | Self::Register | Self::FederatedLogin => "Something went wrong",
            Self::Logout => "Could not sign out",
        }
    }

    const fn sign_in_prompt(self) -> &'static str {
        match self {
            Self::CreateProduct => "Please sign in to add products",
            Self::UpdateProduct => "Please sign in to edit products",
            Self::DeleteProduct => "Please sign in to delete products",
            _ => "Please sign in to continue",
        }
    }

    /// Notification for a successful `operation`.
    #[must_use]
    pub fn success(self) -> Notification {
        let (title, description) = match self {
            Self::CreateProduct => ("Success", "New product added"),
            Self::UpdateProduct => ("Success", "Product updated"),
            Self::DeleteProduct => ("Deleted", "Product removed"),
            Self::Login => ("Logged in", ""),
            Self::Register => ("Signed up", ""),
            Self::FederatedLogin => ("Signed in with Google", ""),
            Self::Logout => ("Logged out", ""),
            Self::LoadCatalog | Self::LoadProduct => ("Loaded", ""),
        };
        Notification {
            title: title.to_string(),
            description: description.to_string(),
            variant: Variant::Default,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LoadCatalog => "load_catalog",
            Self::LoadProduct => "load_product",
            Self::CreateProduct => "create_product",
            Self::UpdateProduct => "update_product",
            Self::DeleteProduct => "delete_product",
            Self::Login => "login",
            Self::Register => "register",
            Self::FederatedLogin => "federated_login",
            Self::Logout => "logout",
        };
        f.write_str(name)
    }
}

/// Visual treatment of a notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Variant {
    #[default]
    Default,
    Destructive,
}

/// A transient user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: Variant,
}

impl Notification {
    fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: Variant::Destructive,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            f.write_str(&self.title)
        } else {
            write!(f, "{}: {}", self.title, self.description)
        }
    }
}

// =============================================================================
// Sentry context
// =============================================================================

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
