//! REST API client module for the tasknode backend.
//!
//! This module provides the `ApiClient` for logging in, refreshing and
//! verifying tokens, and obtaining pre-signed upload URLs. The `AuthApi`
//! trait is the seam the session manager and submit workflow depend on.
//!
//! Authenticated endpoints use JWT bearer tokens issued by the login and
//! signup endpoints.

pub mod client;
pub mod error;
pub mod types;

pub use client::{ApiClient, AuthApi};
pub use error::ApiError;
pub use types::{LoginTokens, RefreshedTokens, SignupTokens, TokenStatus, UploadDestination};

#[cfg(test)]
pub use client::MockAuthApi;
