//! Atelier storefront client library.
//!
//! Catalog state with confirm-first CRUD reconciliation, the filter/paginate
//! pipeline behind the browsing views, and the session lifecycle (password,
//! registration and federated sign-in) shared by every front end.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod forms;
pub mod models;
pub mod services;
pub mod state;
