use serde::{Deserialize, Serialize};

/// Content type of deploy archives sent to pre-signed URLs
pub const ZIP_CONTENT_TYPE: &str = "application/zip";

/// Tokens returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginTokens {
    pub access_token: String,
    pub id_token: String,
    pub refresh_token: String,
}

/// Tokens returned by a successful signup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignupTokens {
    pub access_token: String,
    pub id_token: String,
    pub refresh_token: String,
    /// Lifetime of the access token in seconds, informational only
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl From<SignupTokens> for LoginTokens {
    fn from(tokens: SignupTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            id_token: tokens.id_token,
            refresh_token: tokens.refresh_token,
        }
    }
}

/// Tokens returned by the refresh endpoint. The refresh token itself is kept.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshedTokens {
    pub access_token: String,
    pub id_token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    Valid,
    Unauthorized,
}

/// A single-use, server-issued upload target.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadDestination {
    #[serde(rename = "signedUrl")]
    pub signed_url: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

fn default_content_type() -> String {
    ZIP_CONTENT_TYPE.to_string()
}

#[derive(Debug, Serialize)]
pub(crate) struct CredentialsRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}
