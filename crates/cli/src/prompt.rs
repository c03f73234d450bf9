//! Terminal input.
//!
//! Prompts go to stderr so stdout only carries command output.

use std::io::{self, BufRead, Write};

use async_trait::async_trait;
use atelier_storefront::services::federated::{BridgeError, CredentialPrompt};
use secrecy::SecretString;

/// Read one line from stdin after printing `prompt`, without the line ending.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read or written.
pub fn read_line(prompt: &str) -> io::Result<String> {
    let mut stderr = io::stderr().lock();
    write!(stderr, "{prompt}")?;
    stderr.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Like [`read_line`], for secrets.
///
/// # Errors
///
/// Returns an error if the terminal cannot be read or written.
pub fn read_secret(prompt: &str) -> io::Result<SecretString> {
    read_line(prompt).map(SecretString::from)
}

/// Google sign-in completed by the user in a browser.
///
/// The user pastes the ID token issued for the client; an empty line cancels.
pub struct TerminalPrompt;

#[async_trait]
impl CredentialPrompt for TerminalPrompt {
    async fn ask(&self, client_id: &str) -> Result<Option<String>, BridgeError> {
        let message = format!(
            "Sign in with Google for client {client_id}, then paste the ID token (empty to cancel): "
        );
        let line = tokio::task::spawn_blocking(move || read_line(&message))
            .await
            .map_err(|e| BridgeError::Provider(e.to_string()))?
            .map_err(|e| BridgeError::Provider(e.to_string()))?;

        Ok(Some(line.trim().to_string()).filter(|token| !token.is_empty()))
    }
}
