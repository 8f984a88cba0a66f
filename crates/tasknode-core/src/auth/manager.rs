use tracing::{debug, info, warn};

use super::credentials::SecretStore;
use super::session::{Session, ACCESS_TOKEN_KEY, ID_TOKEN_KEY, REFRESH_TOKEN_KEY};
use crate::api::{AuthApi, LoginTokens, TokenStatus};
use crate::error::{Error, Result};

pub const LOGIN_REQUIRED_MESSAGE: &str = "Please login first using 'tasknode login'";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    LoggedOut,
    AlreadyLoggedOut,
}

/// Produces a currently valid access token from the stored session,
/// refreshing it at most once per call.
pub struct SessionManager<A, S> {
    api: A,
    store: S,
}

impl<A: AuthApi, S: SecretStore> SessionManager<A, S> {
    pub fn new(api: A, store: S) -> Self {
        Self { api, store }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether an access token is stored. Makes no network calls.
    pub fn has_session(&self) -> Result<bool> {
        Ok(self.stored_access_token()?.is_some())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let session: Session = self.api.login(email, password).await?.into();
        session.save(&self.store)?;
        info!("Logged in");
        Ok(session)
    }

    pub async fn signup(&self, email: &str, password: &str) -> Result<Session> {
        let tokens = self.api.signup(email, password).await?;
        if let Some(expires_in) = tokens.expires_in {
            debug!(expires_in, "Signup issued access token");
        }
        let session: Session = LoginTokens::from(tokens).into();
        session.save(&self.store)?;
        info!("Signed up");
        Ok(session)
    }

    /// Remove all stored tokens. Missing tokens are not an error.
    pub fn logout(&self) -> Result<LogoutOutcome> {
        if Session::clear(&self.store)? {
            info!("Logged out");
            Ok(LogoutOutcome::LoggedOut)
        } else {
            Ok(LogoutOutcome::AlreadyLoggedOut)
        }
    }

    /// Return a verified access token.
    ///
    /// A token rejected with 401 triggers exactly one refresh attempt; if
    /// that fails the session is reported as expired.
    pub async fn get_valid_token(&self) -> Result<String> {
        let access_token = self
            .stored_access_token()?
            .ok_or_else(|| Error::Auth(LOGIN_REQUIRED_MESSAGE.to_string()))?;

        match self.api.verify(&access_token).await? {
            TokenStatus::Valid => Ok(access_token),
            TokenStatus::Unauthorized => {
                info!("Access token rejected, attempting refresh");
                self.refresh_access_token().await?.ok_or(Error::SessionExpired)
            }
        }
    }

    async fn refresh_access_token(&self) -> Result<Option<String>> {
        let Some(refresh_token) = non_empty(self.store.get(REFRESH_TOKEN_KEY)?) else {
            warn!("No refresh token stored");
            return Ok(None);
        };

        let Some(tokens) = self.api.refresh(&refresh_token).await else {
            return Ok(None);
        };

        self.store.set(ACCESS_TOKEN_KEY, &tokens.access_token)?;
        self.store.set(ID_TOKEN_KEY, &tokens.id_token)?;
        info!("Access token refreshed");
        Ok(Some(tokens.access_token))
    }

    fn stored_access_token(&self) -> Result<Option<String>> {
        Ok(non_empty(self.store.get(ACCESS_TOKEN_KEY)?))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
