use super::credentials::{CredentialError, SecretStore};
use crate::api::LoginTokens;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const ID_TOKEN_KEY: &str = "id_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

const TOKEN_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, ID_TOKEN_KEY, REFRESH_TOKEN_KEY];

/// Tokens persisted in the secret store between invocations.
/// No expiry is stored; the backend decides validity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub identity_token: String,
    pub refresh_token: String,
}

impl From<LoginTokens> for Session {
    fn from(tokens: LoginTokens) -> Self {
        Self {
            access_token: tokens.access_token,
            identity_token: tokens.id_token,
            refresh_token: tokens.refresh_token,
        }
    }
}

impl Session {
    /// Load a complete session. Returns `None` if any token is missing.
    pub fn load<S: SecretStore + ?Sized>(store: &S) -> Result<Option<Self>, CredentialError> {
        let access_token = store.get(ACCESS_TOKEN_KEY)?;
        let identity_token = store.get(ID_TOKEN_KEY)?;
        let refresh_token = store.get(REFRESH_TOKEN_KEY)?;

        Ok(match (access_token, identity_token, refresh_token) {
            (Some(access_token), Some(identity_token), Some(refresh_token)) => Some(Self {
                access_token,
                identity_token,
                refresh_token,
            }),
            _ => None,
        })
    }

    pub fn save<S: SecretStore + ?Sized>(&self, store: &S) -> Result<(), CredentialError> {
        store.set(ACCESS_TOKEN_KEY, &self.access_token)?;
        store.set(ID_TOKEN_KEY, &self.identity_token)?;
        store.set(REFRESH_TOKEN_KEY, &self.refresh_token)?;
        Ok(())
    }

    /// Delete every token. Returns whether anything was removed.
    pub fn clear<S: SecretStore + ?Sized>(store: &S) -> Result<bool, CredentialError> {
        let mut removed = false;
        for key in TOKEN_KEYS {
            match store.delete(key) {
                Ok(()) => removed = true,
                Err(CredentialError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryStore;

    fn session() -> Session {
        Session {
            access_token: "at".into(),
            identity_token: "it".into(),
            refresh_token: "rt".into(),
        }
    }

    #[test]
    fn test_save_and_load() {
        let store = MemoryStore::new();
        assert_eq!(Session::load(&store).unwrap(), None);

        session().save(&store).unwrap();
        assert_eq!(store.get(ID_TOKEN_KEY).unwrap().as_deref(), Some("it"));
        assert_eq!(Session::load(&store).unwrap(), Some(session()));
    }

    #[test]
    fn test_partial_session_is_not_loaded() {
        let store = MemoryStore::new();
        store.set(ACCESS_TOKEN_KEY, "at").unwrap();
        assert_eq!(Session::load(&store).unwrap(), None);
    }

    #[test]
    fn test_clear_tolerates_missing_keys() {
        let store = MemoryStore::new();
        assert!(!Session::clear(&store).unwrap());

        store.set(REFRESH_TOKEN_KEY, "rt").unwrap();
        assert!(Session::clear(&store).unwrap());
        assert_eq!(store.get(REFRESH_TOKEN_KEY).unwrap(), None);
    }
}
