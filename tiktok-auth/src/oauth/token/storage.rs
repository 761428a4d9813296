//! Token storage trait for persisting token data between runs.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::TokenData;
use crate::error::{storage_error, Error, StorageErrorKind};

/// Trait for storing and retrieving token data.
///
/// The connector only produces the next token-data value; the host decides where it lives.
/// Implementations should:
/// - Encrypt token data at rest (see [`super::encryption`])
/// - Replace records wholesale, never merge
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store token data for a credential, replacing any previous record.
    async fn store(&self, credential_id: &str, data: &TokenData) -> Result<(), Error>;

    /// Retrieve token data for a credential.
    ///
    /// # Returns
    ///
    /// `Some(TokenData)` if found, `None` if not found.
    async fn get(&self, credential_id: &str) -> Result<Option<TokenData>, Error>;

    /// Delete token data for a credential.
    async fn delete(&self, credential_id: &str) -> Result<(), Error>;
}

/// Process-local storage, for tests and one-shot hosts.
#[derive(Default)]
pub struct MemoryStorage {
    records: Mutex<HashMap<String, TokenData>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, TokenData>>, Error> {
        self.records
            .lock()
            .map_err(|_| storage_error(StorageErrorKind::Io, "token storage lock poisoned"))
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn store(&self, credential_id: &str, data: &TokenData) -> Result<(), Error> {
        self.lock()?.insert(credential_id.to_string(), data.clone());
        Ok(())
    }

    async fn get(&self, credential_id: &str) -> Result<Option<TokenData>, Error> {
        Ok(self.lock()?.get(credential_id).cloned())
    }

    async fn delete(&self, credential_id: &str) -> Result<(), Error> {
        self.lock()?.remove(credential_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_and_get() {
        let storage = MemoryStorage::new();
        let data = TokenData {
            access_token: Some("access".to_string()),
            refresh_token: Some("refresh".to_string()),
            ..Default::default()
        };

        storage.store("default", &data).await.unwrap();

        let retrieved = storage.get("default").await.unwrap();
        assert_eq!(retrieved, Some(data));
        assert!(storage.get("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_replaces_wholesale() {
        let storage = MemoryStorage::new();
        let first = TokenData {
            access_token: Some("one".to_string()),
            scope: Some("user.info.basic".to_string()),
            ..Default::default()
        };
        let second = TokenData {
            access_token: Some("two".to_string()),
            ..Default::default()
        };

        storage.store("default", &first).await.unwrap();
        storage.store("default", &second).await.unwrap();

        let retrieved = storage.get("default").await.unwrap().unwrap();
        assert_eq!(retrieved.access_token.as_deref(), Some("two"));
        assert_eq!(retrieved.scope, None);
    }

    #[tokio::test]
    async fn test_delete() {
        let storage = MemoryStorage::new();
        storage.store("default", &TokenData::default()).await.unwrap();

        storage.delete("default").await.unwrap();

        assert!(storage.get("default").await.unwrap().is_none());
    }
}
