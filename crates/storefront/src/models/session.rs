//! Session-related types.
//!
//! A session is the (token, user) pair handed out by the authentication
//! endpoints. At most one is active at a time.

use secrecy::{ExposeSecret, SecretString};

use crate::api::{AuthResponse, AuthUser};

/// An authenticated identity.
///
/// `Debug` is derived through `SecretString`, which redacts the token.
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque bearer credential.
    pub token: SecretString,
    /// Who the token belongs to.
    pub user: AuthUser,
}

impl Session {
    /// Create a session from its parts.
    #[must_use]
    pub fn new(token: impl Into<String>, user: AuthUser) -> Self {
        Self {
            token: SecretString::from(token.into()),
            user,
        }
    }

    /// The raw token, for writing to durable storage.
    #[must_use]
    pub fn expose_token(&self) -> &str {
        self.token.expose_secret()
    }
}

impl From<AuthResponse> for Session {
    fn from(response: AuthResponse) -> Self {
        Self::new(response.token, response.user)
    }
}

/// Durable storage keys for session data.
///
/// Both are written together on persist and removed together on logout.
pub mod keys {
    /// Key for the bearer token.
    pub const TOKEN: &str = "tc_token";

    /// Key for the JSON-encoded user record.
    pub const USER: &str = "tc_user";
}
