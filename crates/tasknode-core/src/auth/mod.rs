//! Authentication module for managing user sessions and credentials.
//!
//! This module provides:
//! - `SecretStore`: key-value secret storage, backed by the OS keychain
//! - `Session`: the three tokens persisted between invocations
//! - `SessionManager`: login, signup, logout and token refresh
//!
//! Token validity is always decided by the backend's verify endpoint.

pub mod credentials;
pub mod manager;
pub mod session;

pub use credentials::{CredentialError, KeyringStore, MemoryStore, SecretStore};
pub use manager::{LogoutOutcome, SessionManager, LOGIN_REQUIRED_MESSAGE};
pub use session::Session;
