//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `ATELIER_API_BASE_URL` - Base URL of the REST API (default: `http://localhost:4000/api`)
//! - `ATELIER_GOOGLE_CLIENT_ID` - Federated sign-in client ID (federated login is disabled without it)
//! - `ATELIER_GOOGLE_SCRIPT_URL` - Identity provider SDK location
//! - `ATELIER_STATE_DIR` - Directory holding the persisted session (default: `~/.atelier`)
//! - `ATELIER_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:4000/api";
const DEFAULT_GOOGLE_SCRIPT_URL: &str = "https://accounts.google.com/gsi/client";
const DEFAULT_HTTP_TIMEOUT_SECS: &str = "30";
const STATE_DIR_NAME: &str = ".atelier";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your_",
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Placeholder value in {0}: {1}")]
    Placeholder(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL every REST endpoint is resolved against
    pub api_base_url: Url,
    /// Per-request transport timeout
    pub http_timeout: Duration,
    /// Directory holding the durable session file
    pub state_dir: PathBuf,
    /// Federated identity provider configuration
    pub federated: FederatedConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Federated identity provider configuration.
///
/// The client ID is kept raw; it is only checked when the federated flow is
/// requested so a missing value disables that one affordance instead of
/// refusing to start.
#[derive(Debug, Clone)]
pub struct FederatedConfig {
    /// Client ID as supplied by the deployment, if any
    pub client_id: Option<String>,
    /// Provider SDK location
    pub script_url: Url,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid, or if no
    /// state directory can be determined.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = parse_http_url(
            "ATELIER_API_BASE_URL",
            &get_env_or_default("ATELIER_API_BASE_URL", DEFAULT_API_BASE_URL),
        )?;
        let http_timeout = get_env_or_default("ATELIER_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| {
                ConfigError::InvalidEnvVar("ATELIER_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
        let state_dir = match get_optional_env("ATELIER_STATE_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .map(|home| home.join(STATE_DIR_NAME))
                .ok_or_else(|| ConfigError::MissingEnvVar("ATELIER_STATE_DIR".to_string()))?,
        };

        let federated = FederatedConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            api_base_url,
            http_timeout,
            state_dir,
            federated,
            sentry_dsn,
        })
    }

    /// Configuration pointing at `api_base_url`, with defaults for the rest.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL is not http(s).
    pub fn for_api(api_base_url: &str, state_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self {
            api_base_url: parse_http_url("ATELIER_API_BASE_URL", api_base_url)?,
            http_timeout: Duration::from_secs(30),
            state_dir: state_dir.into(),
            federated: FederatedConfig {
                client_id: None,
                script_url: parse_http_url("ATELIER_GOOGLE_SCRIPT_URL", DEFAULT_GOOGLE_SCRIPT_URL)?,
            },
            sentry_dsn: None,
        })
    }
}

impl FederatedConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            client_id: get_optional_env("ATELIER_GOOGLE_CLIENT_ID"),
            script_url: parse_http_url(
                "ATELIER_GOOGLE_SCRIPT_URL",
                &get_env_or_default("ATELIER_GOOGLE_SCRIPT_URL", DEFAULT_GOOGLE_SCRIPT_URL),
            )?,
        })
    }

    /// The usable client ID.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if no client ID is configured and
    /// `ConfigError::Placeholder` if it is a template value.
    pub fn client_id(&self) -> Result<&str, ConfigError> {
        let client_id = self
            .client_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("ATELIER_GOOGLE_CLIENT_ID".to_string()))?;
        reject_placeholder(client_id, "ATELIER_GOOGLE_CLIENT_ID")?;
        Ok(client_id)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a URL that must use the http or https scheme.
fn parse_http_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Reject values that look like an unfilled template.
fn reject_placeholder(value: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::Placeholder(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn federated(client_id: Option<&str>) -> FederatedConfig {
        FederatedConfig {
            client_id: client_id.map(String::from),
            script_url: Url::parse(DEFAULT_GOOGLE_SCRIPT_URL).unwrap(),
        }
    }

    #[test]
    fn test_client_id_missing() {
        let err = federated(None).client_id().unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));

        let err = federated(Some("   ")).client_id().unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(_)));
    }

    #[test]
    fn test_client_id_placeholder() {
        let err = federated(Some("your_google_client_id_here"))
            .client_id()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Placeholder(_, _)));
    }

    #[test]
    fn test_client_id_valid() {
        let config = federated(Some(" 1234-abcd.apps.googleusercontent.com "));
        assert_eq!(
            config.client_id().unwrap(),
            "1234-abcd.apps.googleusercontent.com"
        );
    }

    #[test]
    fn test_parse_http_url_rejects_other_schemes() {
        assert!(parse_http_url("TEST", "ftp://example.com").is_err());
        assert!(parse_http_url("TEST", "not a url").is_err());
        assert!(parse_http_url("TEST", "https://api.example.com/api").is_ok());
    }

    #[test]
    fn test_for_api_defaults() {
        let config = StorefrontConfig::for_api("http://localhost:4000/api", "/tmp/atelier").unwrap();
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert!(config.federated.client_id.is_none());
        assert_eq!(config.api_base_url.path(), "/api");
    }
}
