//! REST API client for products and authentication.
//!
//! # Architecture
//!
//! - One method per remote resource action; no retries, no caching
//! - Every request carries `Authorization: Bearer <token>` when the session
//!   store holds a token; a missing token is left for the server to judge
//! - Remote failures are decoded into [`ApiError`] here so inner layers never
//!   look at raw status codes or error bodies
//!
//! # Example
//!
//! ```rust,ignore
//! use atelier_storefront::api::{ApiClient, ProductApi};
//!
//! let client = ApiClient::new(&config, sessions.clone())?;
//! let products = client.list().await?;
//! ```

pub mod types;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use atelier_core::ProductId;

use crate::config::StorefrontConfig;
use crate::services::session::SessionStore;

pub use types::{AuthResponse, AuthUser, NewProduct, Product, ProductPatch};
use types::{CredentialsBody, FederatedBody, RemoteErrorBody};

/// Errors surfaced by the API client.
///
/// Status-derived variants carry the server's message when it sent one.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server rejected the input (400, 409, 422).
    #[error("Validation failed{}", detail(.0))]
    Validation(Option<String>),

    /// Bad credentials or a missing/expired token (401, 403).
    #[error("Unauthorized{}", detail(.0))]
    Unauthorized(Option<String>),

    /// The remote store has no such entity (404).
    #[error("Not found{}", detail(.0))]
    NotFound(Option<String>),

    /// Any other non-success status.
    #[error("Unexpected status {status}{}", detail(.message))]
    Unknown {
        status: u16,
        message: Option<String>,
    },

    /// Transport failure: connection, TLS, timeout.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A success response whose body could not be decoded.
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

fn detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map_or_else(String::new, |m| format!(": {m}"))
}

impl ApiError {
    /// Map a non-success status and its body to an error.
    #[must_use]
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<RemoteErrorBody>(body)
            .ok()
            .and_then(RemoteErrorBody::into_message);

        match status.as_u16() {
            400 | 409 | 422 => Self::Validation(message),
            401 | 403 => Self::Unauthorized(message),
            404 => Self::NotFound(message),
            status => Self::Unknown { status, message },
        }
    }

    /// The message the server supplied, if any.
    #[must_use]
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::Validation(m) | Self::Unauthorized(m) | Self::NotFound(m) => m.as_deref(),
            Self::Unknown { message, .. } => message.as_deref(),
            Self::Network(_) | Self::Decode(_) => None,
        }
    }
}

// =============================================================================
// Seams
// =============================================================================

/// Product resource actions.
#[async_trait]
pub trait ProductApi: Send + Sync {
    /// Full, unfiltered catalog snapshot.
    async fn list(&self) -> Result<Vec<Product>, ApiError>;
    async fn get(&self, id: &ProductId) -> Result<Product, ApiError>;
    async fn create(&self, product: &NewProduct) -> Result<Product, ApiError>;
    async fn update(&self, id: &ProductId, patch: &ProductPatch) -> Result<Product, ApiError>;
    async fn remove(&self, id: &ProductId) -> Result<(), ApiError>;
}

/// Authentication actions. Each success yields a fresh session payload.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError>;
    async fn register(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError>;
    async fn federated_login(&self, credential: &str) -> Result<AuthResponse, ApiError>;
}

// =============================================================================
// ApiClient
// =============================================================================

/// `reqwest`-backed client for the storefront REST API.
///
/// Cheap to clone; clones share the connection pool and session store.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    sessions: SessionStore,
}

impl ApiClient {
    /// Create a client for the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Network` if the HTTP client cannot be built.
    pub fn new(config: &StorefrontConfig, sessions: SessionStore) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("atelier/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_base_url.clone(),
                sessions,
            }),
        })
    }

    /// The underlying HTTP client, for collaborators that share its pool.
    #[must_use]
    pub fn http(&self) -> &reqwest::Client {
        &self.inner.client
    }

    /// Resolve path segments below the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.inner.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Start a request, attaching the bearer token when one is stored.
    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let builder = self.inner.client.request(method, self.endpoint(segments));
        match self.inner.sessions.token() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and turn non-success statuses into errors.
    async fn send(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(
                status = %status,
                body = %body.chars().take(200).collect::<String>(),
                "API returned non-success status"
            );
            return Err(ApiError::from_status(status, &body));
        }

        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send(builder).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl ProductApi for ApiClient {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Product>, ApiError> {
        self.send_json(self.request(Method::GET, &["products"])).await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get(&self, id: &ProductId) -> Result<Product, ApiError> {
        self.send_json(self.request(Method::GET, &["products", id.as_str()]))
            .await
    }

    #[instrument(skip(self, product), fields(name = %product.name))]
    async fn create(&self, product: &NewProduct) -> Result<Product, ApiError> {
        self.send_json(self.request(Method::POST, &["products"]).json(product))
            .await
    }

    #[instrument(skip(self, patch), fields(id = %id))]
    async fn update(&self, id: &ProductId, patch: &ProductPatch) -> Result<Product, ApiError> {
        self.send_json(
            self.request(Method::PUT, &["products", id.as_str()])
                .json(patch),
        )
        .await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn remove(&self, id: &ProductId) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, &["products", id.as_str()]))
            .await
            .map(drop)
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    #[instrument(skip(self, password))]
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.send_json(
            self.request(Method::POST, &["auth", "login"])
                .json(&CredentialsBody { email, password }),
        )
        .await
    }

    #[instrument(skip(self, password))]
    async fn register(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        self.send_json(
            self.request(Method::POST, &["auth", "register"])
                .json(&CredentialsBody { email, password }),
        )
        .await
    }

    #[instrument(skip_all)]
    async fn federated_login(&self, credential: &str) -> Result<AuthResponse, ApiError> {
        self.send_json(
            self.request(Method::POST, &["auth", "google"])
                .json(&FederatedBody { credential }),
        )
        .await
    }
}
