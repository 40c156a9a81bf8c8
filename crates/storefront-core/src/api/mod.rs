//! REST API client module for the storefront backend.
//!
//! This module provides:
//! - `Transport` / `HttpTransport`: the HTTP seam the session manager drives
//! - `ApiClient`: typed catalog, cart, order and admin endpoints
//! - `ApiError`: the failure taxonomy surfaced to callers
//!
//! Every `ApiClient` call is routed through the `SessionManager`, which
//! attaches the bearer token and transparently refreshes it on expiry.

pub mod admin;
pub mod client;
pub mod error;
pub mod transport;

pub use client::{ApiClient, ProductQuery};
pub use error::{server_message, ApiError};
pub use transport::{ApiRequest, HttpTransport, Method, Transport, TransportError, TransportResponse};
