use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use keyring::Entry;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("No stored credential named '{0}'")]
    NotFound(String),

    #[error("{0}")]
    Backend(String),
}

/// Key-value secret storage scoped to one service.
pub trait SecretStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError>;

    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError>;

    /// Fails with `CredentialError::NotFound` when the key is absent.
    fn delete(&self, key: &str) -> Result<(), CredentialError>;
}

impl<T: SecretStore + ?Sized> SecretStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), CredentialError> {
        (**self).delete(key)
    }
}

/// Secrets stored in the OS keychain under a fixed service name.
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry, CredentialError> {
        Entry::new(&self.service, key).map_err(|e| {
            CredentialError::Backend(format!("Failed to create keyring entry: {}", e))
        })
    }
}

impl SecretStore for KeyringStore {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(CredentialError::Backend(format!(
                "Failed to retrieve {} from keychain: {}",
                key, e
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        self.entry(key)?.set_password(value).map_err(|e| {
            CredentialError::Backend(format!("Failed to store {} in keychain: {}", key, e))
        })
    }

    fn delete(&self, key: &str) -> Result<(), CredentialError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Err(CredentialError::NotFound(key.to_string())),
            Err(e) => Err(CredentialError::Backend(format!(
                "Failed to delete {} from keychain: {}",
                key, e
            ))),
        }
    }
}

/// Process-local secret storage. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    secrets: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn secrets(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, CredentialError> {
        self.secrets
            .lock()
            .map_err(|_| CredentialError::Backend("Secret store lock poisoned".to_string()))
    }
}

impl SecretStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CredentialError> {
        Ok(self.secrets()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CredentialError> {
        self.secrets()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CredentialError> {
        self.secrets()?
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| CredentialError::NotFound(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("access_token").unwrap(), None);

        store.set("access_token", "abc").unwrap();
        store.set("access_token", "def").unwrap();
        assert_eq!(store.get("access_token").unwrap().as_deref(), Some("def"));

        store.delete("access_token").unwrap();
        assert_eq!(store.get("access_token").unwrap(), None);
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.delete("refresh_token"),
            Err(CredentialError::NotFound(key)) if key == "refresh_token"
        ));
    }

    #[test]
    fn test_arc_store_shares_state() {
        let store = Arc::new(MemoryStore::new());
        let shared = Arc::clone(&store);
        shared.set("id_token", "xyz").unwrap();
        assert_eq!(store.get("id_token").unwrap().as_deref(), Some("xyz"));
    }
}
