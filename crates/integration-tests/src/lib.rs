//! Integration tests for the Atelier storefront client.
//!
//! Each test runs the real `reqwest`-backed API client against a
//! `wiremock` server standing in for the storefront REST API.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p atelier-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `api_client` - Request shape, bearer header, error taxonomy
//! - `catalog` - Confirm-first create/update/delete reconciliation
//! - `auth` - Login, registration, Google sign-in and logout

use std::path::Path;

use atelier_core::{Email, UserId};
use atelier_storefront::api::AuthUser;
use atelier_storefront::config::StorefrontConfig;
use atelier_storefront::models::Session;
use atelier_storefront::state::AppState;
use serde_json::{Value, json};
use tempfile::TempDir;
use uuid::Uuid;
use wiremock::MockServer;

/// Path prefix the mock API is served under.
pub const API_PREFIX: &str = "/api";

/// A mock API server plus client state rooted in a temporary directory.
pub struct TestContext {
    pub server: MockServer,
    pub state: AppState,
    dir: TempDir,
}

impl TestContext {
    /// Fresh context with no session.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory or client cannot be created.
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let state = AppState::new(Self::config(&server, dir.path()))
            .unwrap_or_else(|e| panic!("app state: {e}"));
        Self { server, state, dir }
    }

    /// Context whose persisted session holds `token`.
    ///
    /// # Panics
    ///
    /// Panics if the session cannot be written.
    pub async fn signed_in(token: &str) -> Self {
        let ctx = Self::new().await;
        ctx.state
            .sessions()
            .persist(&Session::new(token, user("shopper@atelier.vn")))
            .unwrap_or_else(|e| panic!("persist: {e}"));
        ctx
    }

    /// Configuration pointing at `server`, optionally with a Google client ID.
    ///
    /// # Panics
    ///
    /// Panics if the mock server URI is not a valid base URL.
    pub fn config(server: &MockServer, state_dir: &Path) -> StorefrontConfig {
        let mut config = StorefrontConfig::for_api(&format!("{}{API_PREFIX}", server.uri()), state_dir)
            .unwrap_or_else(|e| panic!("config: {e}"));
        config.federated.script_url = format!("{}/gsi/client", server.uri())
            .parse()
            .unwrap_or_else(|e| panic!("script url: {e}"));
        config
    }

    /// Rebuild state from the same directory, as a restarted process would.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be created.
    #[must_use]
    pub fn restart(&self) -> AppState {
        AppState::new(Self::config(&self.server, self.dir.path()))
            .unwrap_or_else(|e| panic!("app state: {e}"))
    }

    #[must_use]
    pub fn state_dir(&self) -> &Path {
        self.dir.path()
    }
}

/// Full path of an API endpoint on the mock server.
#[must_use]
pub fn api_path(endpoint: &str) -> String {
    format!("{API_PREFIX}{endpoint}")
}

/// A user record as the API returns it.
///
/// # Panics
///
/// Panics if `email` is malformed.
#[must_use]
pub fn user(email: &str) -> AuthUser {
    AuthUser {
        id: UserId::new(Uuid::new_v4().simple().to_string()),
        email: Email::parse(email).unwrap_or_else(|e| panic!("email: {e}")),
    }
}

/// A product document with a store-assigned `_id`.
#[must_use]
pub fn product_json(id: &str, name: &str, price: u64) -> Value {
    json!({
        "_id": id,
        "name": name,
        "description": format!("{name} - 100% cotton"),
        "price": price,
        "image": "",
        "category": "polo",
    })
}

/// A product document with a freshly generated `_id`.
#[must_use]
pub fn new_product_json(name: &str, price: u64) -> Value {
    product_json(&Uuid::new_v4().simple().to_string(), name, price)
}

/// An auth response body for `email`.
#[must_use]
pub fn auth_json(token: &str, email: &str) -> Value {
    json!({
        "token": token,
        "user": { "_id": Uuid::new_v4().simple().to_string(), "email": email },
    })
}
