//! Authentication module for managing the user session and its tokens.
//!
//! This module provides:
//! - `SessionManager`: token ownership, credential attachment, refresh-and-retry
//! - `CredentialStore`: durable token storage (OS keychain via keyring, or in memory)
//! - `Role` / `is_admin_role_set`: customer vs admin classification
//!
//! Tokens are persisted under the keys `access_token` and `refresh_token`.

pub mod credentials;
pub mod roles;
pub mod session;
pub mod tokens;

pub use credentials::{CredentialStore, KeyringStore, MemoryStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
pub use roles::{is_admin_role_set, Role};
pub use session::{AuthResponse, AuthStatus, RefreshResponse, SessionManager};
pub use tokens::{AccessToken, RefreshToken};
