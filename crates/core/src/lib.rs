//! Atelier Core - Shared domain types.
//!
//! This crate provides the types used across all Atelier components:
//! - `storefront` - Catalog, session and authentication library
//! - `cli` - Terminal view layer over the storefront library
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for identifiers, prices, emails, and categories

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
