//! Sign-in, registration and logout commands.

use std::io::Write;

use atelier_storefront::error::Operation;
use atelier_storefront::forms::CredentialsForm;
use atelier_storefront::state::AppState;
use secrecy::{ExposeSecret, SecretString};

use super::{CliError, OperationExt};
use crate::prompt::{TerminalPrompt, read_secret};
use crate::render;

fn password_or_prompt(password: Option<String>) -> Result<SecretString, CliError> {
    match password {
        Some(password) => Ok(SecretString::from(password)),
        None => Ok(read_secret("Password: ")?),
    }
}

/// `atelier auth login`
pub async fn login(
    state: &AppState,
    out: &mut impl Write,
    email: String,
    password: Option<String>,
) -> Result<(), CliError> {
    let password = password_or_prompt(password)?;
    let form = CredentialsForm::new(email, password.expose_secret());

    let user = state.auth().login(&form).await.during(Operation::Login)?;

    render::notification(out, &Operation::Login.success())?;
    render::user(out, Some(&user))?;
    Ok(())
}

/// `atelier auth register`
pub async fn register(
    state: &AppState,
    out: &mut impl Write,
    email: String,
    password: Option<String>,
) -> Result<(), CliError> {
    let password = password_or_prompt(password)?;
    let form = CredentialsForm::new(email, password.expose_secret());

    let user = state.auth().register(&form).await.during(Operation::Register)?;

    render::notification(out, &Operation::Register.success())?;
    render::user(out, Some(&user))?;
    Ok(())
}

/// `atelier auth google`
pub async fn google(state: &AppState, out: &mut impl Write) -> Result<(), CliError> {
    let auth = state.auth();
    let mut bridge = state.federated_bridge(TerminalPrompt);

    let user = auth
        .federated_login(&mut bridge, &state.config().federated)
        .await
        .during(Operation::FederatedLogin)?;

    match user {
        Some(user) => {
            render::notification(out, &Operation::FederatedLogin.success())?;
            render::user(out, Some(&user))?;
        }
        None => writeln!(out, "Google sign-in was cancelled.")?,
    }
    Ok(())
}

/// `atelier auth logout`
pub fn logout(state: &AppState, out: &mut impl Write) -> Result<(), CliError> {
    state.auth().logout().during(Operation::Logout)?;
    render::notification(out, &Operation::Logout.success())?;
    Ok(())
}

/// `atelier auth whoami`
pub fn whoami(state: &AppState, out: &mut impl Write) -> Result<(), CliError> {
    render::user(out, state.auth().current_user().as_ref())?;
    Ok(())
}
