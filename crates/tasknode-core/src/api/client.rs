//! API client for communicating with the tasknode REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::types::{CredentialsRequest, RefreshRequest};
use super::{ApiError, LoginTokens, RefreshedTokens, SignupTokens, TokenStatus, UploadDestination};
use crate::config::Config;
use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

const LOGIN_PATH: &str = "/api/v1/users/login";
const SIGNUP_PATH: &str = "/api/v1/users/signup";
const REFRESH_PATH: &str = "/api/v1/users/refresh-token";
const VERIFY_PATH: &str = "/api/v1/users/verify-token";
const UPLOAD_URL_PATH: &str = "/api/v1/jobs/get_zip_upload_url";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Login failed: Invalid credentials. \
If you forgot your password, you can reset it using 'tasknode reset-password'. \
To sign up, use 'tasknode signup'.";

/// Remote operations used by the session manager and the submit workflow.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn signup(&self, email: &str, password: &str) -> Result<SignupTokens>;

    async fn login(&self, email: &str, password: &str) -> Result<LoginTokens>;

    /// `Unauthorized` is only returned for HTTP 401; transport failures and
    /// other statuses are errors.
    async fn verify(&self, access_token: &str) -> Result<TokenStatus>;

    /// Any failure yields `None`.
    async fn refresh(&self, refresh_token: &str) -> Option<RefreshedTokens>;

    async fn get_upload_url(&self, access_token: &str) -> Result<UploadDestination>;

    async fn upload(&self, destination: &UploadDestination, body: Vec<u8>) -> Result<()>;
}

/// API client for the tasknode backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> std::result::Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(
        response: reqwest::Response,
    ) -> std::result::Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Read the error detail of a failed response.
    async fn failure_detail(response: reqwest::Response) -> String {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        ApiError::detail(status, &body)
    }

    async fn parse<T: DeserializeOwned>(
        response: reqwest::Response,
        what: &str,
    ) -> std::result::Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse {}: {}", what, e)))
    }

    async fn send_credentials(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> std::result::Result<reqwest::Response, ApiError> {
        let url = self.url(path);
        debug!(url = %url, "Sending credentials");
        let response = self
            .client
            .post(&url)
            .json(&CredentialsRequest { email, password })
            .send()
            .await?;
        Ok(response)
    }

    async fn try_refresh(
        &self,
        refresh_token: &str,
    ) -> std::result::Result<RefreshedTokens, ApiError> {
        let response = self
            .client
            .post(self.url(REFRESH_PATH))
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        Self::parse(response, "refresh response").await
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn signup(&self, email: &str, password: &str) -> Result<SignupTokens> {
        let response = self.send_credentials(SIGNUP_PATH, email, password).await?;
        if !response.status().is_success() {
            let detail = Self::failure_detail(response).await;
            return Err(Error::Auth(format!("Signup failed: {}", detail)));
        }
        Ok(Self::parse(response, "signup response").await?)
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginTokens> {
        let response = self.send_credentials(LOGIN_PATH, email, password).await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Auth(INVALID_CREDENTIALS_MESSAGE.to_string()));
        }
        if !status.is_success() {
            let detail = Self::failure_detail(response).await;
            return Err(Error::Auth(format!("Login failed: {}", detail)));
        }
        Ok(Self::parse(response, "login response").await?)
    }

    async fn verify(&self, access_token: &str) -> Result<TokenStatus> {
        let response = self
            .client
            .get(self.url(VERIFY_PATH))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(ApiError::from)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            debug!("Access token rejected by verify endpoint");
            return Ok(TokenStatus::Unauthorized);
        }
        Self::check_response(response).await?;
        Ok(TokenStatus::Valid)
    }

    async fn refresh(&self, refresh_token: &str) -> Option<RefreshedTokens> {
        match self.try_refresh(refresh_token).await {
            Ok(tokens) => Some(tokens),
            Err(e) => {
                warn!(error = %e, "Token refresh failed");
                None
            }
        }
    }

    async fn get_upload_url(&self, access_token: &str) -> Result<UploadDestination> {
        let response = self
            .client
            .get(self.url(UPLOAD_URL_PATH))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| Error::Upload(ApiError::from(e).to_string()))?;
        let response = Self::check_response(response)
            .await
            .map_err(|e| Error::Upload(e.to_string()))?;
        Self::parse(response, "upload URL response")
            .await
            .map_err(|e| Error::Upload(e.to_string()))
    }

    async fn upload(&self, destination: &UploadDestination, body: Vec<u8>) -> Result<()> {
        debug!(bytes = body.len(), "Uploading deploy archive");
        let response = self
            .client
            .put(&destination.signed_url)
            .header(header::CONTENT_TYPE, destination.content_type.as_str())
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Upload(ApiError::from(e).to_string()))?;
        Self::check_response(response)
            .await
            .map_err(|e| Error::Upload(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    async fn client_for(server: &mockito::ServerGuard) -> ApiClient {
        ApiClient::new(&Config::with_api_url(server.url())).unwrap()
    }

    #[tokio::test]
    async fn test_login_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", LOGIN_PATH)
            .match_body(Matcher::Json(json!({"email": "a@b.c", "password": "pw"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"at","id_token":"it","refresh_token":"rt"}"#)
            .create_async()
            .await;

        let tokens = client_for(&server).await.login("a@b.c", "pw").await.unwrap();
        assert_eq!(tokens.access_token, "at");
        assert_eq!(tokens.id_token, "it");
        assert_eq!(tokens.refresh_token, "rt");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_login_invalid_credentials() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", LOGIN_PATH)
            .with_status(401)
            .create_async()
            .await;

        let err = client_for(&server).await.login("a@b.c", "bad").await.unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, Error::Auth(_)));
        assert!(message.contains("Invalid credentials"));
        assert!(message.contains("tasknode reset-password"));
        assert!(message.contains("tasknode signup"));
    }

    #[tokio::test]
    async fn test_login_other_failure_surfaces_detail() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", LOGIN_PATH)
            .with_status(403)
            .with_body(r#"{"detail":"User is not confirmed"}"#)
            .create_async()
            .await;

        let err = client_for(&server).await.login("a@b.c", "pw").await.unwrap_err();
        assert_eq!(err.to_string(), "Login failed: User is not confirmed");
    }

    #[tokio::test]
    async fn test_signup_conflict() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", SIGNUP_PATH)
            .with_status(400)
            .with_body(r#"{"detail":"An account with this email already exists"}"#)
            .create_async()
            .await;

        let err = client_for(&server).await.signup("a@b.c", "pw").await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        assert_eq!(
            err.to_string(),
            "Signup failed: An account with this email already exists"
        );
    }

    #[tokio::test]
    async fn test_verify_statuses() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", VERIFY_PATH)
            .match_header("authorization", "Bearer good")
            .with_status(200)
            .create_async()
            .await;
        server
            .mock("GET", VERIFY_PATH)
            .match_header("authorization", "Bearer stale")
            .with_status(401)
            .create_async()
            .await;
        server
            .mock("GET", VERIFY_PATH)
            .match_header("authorization", "Bearer broken")
            .with_status(500)
            .create_async()
            .await;

        let client = client_for(&server).await;
        assert_eq!(client.verify("good").await.unwrap(), TokenStatus::Valid);
        assert_eq!(client.verify("stale").await.unwrap(), TokenStatus::Unauthorized);
        assert!(matches!(
            client.verify("broken").await,
            Err(Error::Api(ApiError::ServerError(_)))
        ));
    }

    #[tokio::test]
    async fn test_verify_transport_failure_is_not_unauthorized() {
        // Nothing listens on port 9 of localhost.
        let client = ApiClient::new(&Config::with_api_url("http://127.0.0.1:9")).unwrap();
        assert!(matches!(
            client.verify("token").await,
            Err(Error::Api(ApiError::NetworkError(_)))
        ));
    }

    #[tokio::test]
    async fn test_refresh_failure_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", REFRESH_PATH)
            .match_body(Matcher::Json(json!({"refresh_token": "rt"})))
            .with_status(400)
            .create_async()
            .await;

        assert!(client_for(&server).await.refresh("rt").await.is_none());
    }

    #[tokio::test]
    async fn test_refresh_success() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", REFRESH_PATH)
            .with_status(200)
            .with_body(r#"{"access_token":"new-at","id_token":"new-it"}"#)
            .create_async()
            .await;

        let tokens = client_for(&server).await.refresh("rt").await.unwrap();
        assert_eq!(tokens.access_token, "new-at");
        assert_eq!(tokens.id_token, "new-it");
    }

    #[tokio::test]
    async fn test_get_upload_url_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", UPLOAD_URL_PATH)
            .with_status(401)
            .create_async()
            .await;

        let err = client_for(&server).await.get_upload_url("at").await.unwrap_err();
        assert!(matches!(err, Error::Upload(_)));
    }

    #[tokio::test]
    async fn test_upload_sends_zip_content_type() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/bucket/deploy.zip")
            .match_header("content-type", "application/zip")
            .match_body("PK-bytes")
            .with_status(200)
            .create_async()
            .await;

        let destination: UploadDestination = serde_json::from_value(json!({
            "signedUrl": format!("{}/bucket/deploy.zip", server.url())
        }))
        .unwrap();
        client_for(&server)
            .await
            .upload(&destination, b"PK-bytes".to_vec())
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upload_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", "/bucket/deploy.zip")
            .with_status(403)
            .with_body("<Error>SignatureDoesNotMatch</Error>")
            .create_async()
            .await;

        let destination: UploadDestination = serde_json::from_value(json!({
            "signedUrl": format!("{}/bucket/deploy.zip", server.url())
        }))
        .unwrap();
        let err = client_for(&server)
            .await
            .upload(&destination, Vec::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("SignatureDoesNotMatch"));
    }
}
