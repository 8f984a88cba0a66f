use thiserror::Error;

use crate::api::ApiError;
use crate::auth::CredentialError;

/// Errors surfaced to the command layer.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Auth(String),

    #[error("Session expired. Please login again using 'tasknode login'")]
    SessionExpired,

    #[error("Script '{0}' not found")]
    ScriptNotFound(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Credential store error: {0}")]
    CredentialStore(#[from] CredentialError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Failed to build deploy package: {0:#}")]
    Package(anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
