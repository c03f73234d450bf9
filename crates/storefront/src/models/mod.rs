//! Domain models for storefront.
//!
//! - [`session`] - The authenticated identity and its storage keys

pub mod session;

pub use session::Session;
