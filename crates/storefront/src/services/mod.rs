//! Client-side services.
//!
//! - `auth` - Sign-in, registration, logout and gating of protected actions
//! - `federated` - Third-party identity provider bridge
//! - `session` - Durable session persistence

pub mod auth;
pub mod federated;
pub mod session;
