//! Command implementations.
//!
//! Each command writes its normal output to `out` and returns a [`CliError`]
//! carrying the user-facing notification when an operation fails.

pub mod auth;
pub mod categories;
pub mod products;

use std::io;

use atelier_storefront::api::ApiClient;
use atelier_storefront::error::{AppError, Notification, Operation};
use atelier_storefront::services::auth::{AuthController, Gate, Intent};
use thiserror::Error;

/// Errors that end a command with a non-zero exit status.
#[derive(Debug, Error)]
pub enum CliError {
    /// An operation failed and has been reported.
    #[error("{notification}")]
    Failed {
        notification: Notification,
        source: AppError,
    },

    /// Writing to the terminal failed.
    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// Attach the failed operation to an error, logging and reporting it.
pub trait OperationExt<T> {
    /// # Errors
    ///
    /// Returns `CliError::Failed` when `self` is an error.
    fn during(self, operation: Operation) -> Result<T, CliError>;
}

impl<T, E: Into<AppError>> OperationExt<T> for Result<T, E> {
    fn during(self, operation: Operation) -> Result<T, CliError> {
        self.map_err(|e| {
            let source = e.into();
            CliError::Failed {
                notification: source.report(operation),
                source,
            }
        })
    }
}

/// Let `intent` through only with an active session.
fn require_session(
    auth: &AuthController<ApiClient>,
    intent: Intent,
    operation: Operation,
) -> Result<Intent, CliError> {
    match auth.gate(intent) {
        Gate::Proceed(intent) => Ok(intent),
        Gate::RequireAuth => Err(AppError::AuthRequired).during(operation),
    }
}
