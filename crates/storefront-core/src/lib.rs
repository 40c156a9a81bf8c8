//! Storefront core library.
//!
//! Client side of an e-commerce backend: an authenticated session that owns
//! the access/refresh token pair, refreshes it once on expiry no matter how
//! many requests are waiting, and retries each rejected request a single
//! time. On top of the session sit typed catalog, cart, order and admin
//! endpoints plus small state containers for listings and the cart.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod store;
pub mod utils;

#[cfg(test)]
mod testing;

pub use api::{ApiClient, ApiError, HttpTransport, ProductQuery, Transport};
pub use auth::{AuthStatus, CredentialStore, KeyringStore, MemoryStore, Role, SessionManager};
pub use config::Config;
pub use store::{CartState, ProductCatalog};
