//! File-backed token storage with encryption at rest.
//!
//! Implements `tiktok_auth::oauth::token::Storage` over a JSON file mapping credential ids
//! to token data sealed with AES-256-GCM. Records are replaced wholesale.

use std::collections::BTreeMap;
use std::io::ErrorKind as IoErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use log::*;

use tiktok_auth::error::{Error, ErrorKind, StorageErrorKind};
use tiktok_auth::oauth::token::{encryption, Storage, TokenData};

pub struct FileStorage {
    path: PathBuf,
    encryption_key: String,
}

fn storage_io_err(err: std::io::Error) -> Error {
    Error {
        source: Some(Box::new(err)),
        error_kind: ErrorKind::Storage(StorageErrorKind::Io),
    }
}

fn storage_json_err(err: serde_json::Error) -> Error {
    Error {
        source: Some(Box::new(err)),
        error_kind: ErrorKind::Storage(StorageErrorKind::Serialization),
    }
}

impl FileStorage {
    pub fn new(path: PathBuf, encryption_key: String) -> Self {
        Self {
            path,
            encryption_key,
        }
    }

    async fn read_records(&self) -> Result<BTreeMap<String, String>, Error> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => serde_json::from_str(&contents).map_err(storage_json_err),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(storage_io_err(e)),
        }
    }

    async fn write_records(&self, records: &BTreeMap<String, String>) -> Result<(), Error> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(storage_io_err)?;
        }

        let contents = serde_json::to_string_pretty(records).map_err(storage_json_err)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, contents)
            .await
            .map_err(storage_io_err)?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(storage_io_err)
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn store(&self, credential_id: &str, data: &TokenData) -> Result<(), Error> {
        let sealed = encryption::seal(data, &self.encryption_key)?;
        let mut records = self.read_records().await?;
        records.insert(credential_id.to_string(), sealed);
        self.write_records(&records).await?;
        debug!("Stored token data for credential {}", credential_id);
        Ok(())
    }

    async fn get(&self, credential_id: &str) -> Result<Option<TokenData>, Error> {
        let records = self.read_records().await?;
        records
            .get(credential_id)
            .map(|sealed| encryption::open(sealed, &self.encryption_key))
            .transpose()
    }

    async fn delete(&self, credential_id: &str) -> Result<(), Error> {
        let mut records = self.read_records().await?;
        if records.remove(credential_id).is_some() {
            self.write_records(&records).await?;
            info!("Deleted token data for credential {}", credential_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    fn tokens(access: &str) -> TokenData {
        TokenData {
            access_token: Some(access.to_string()),
            refresh_token: Some("rft.1".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_store_get_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested/tokens.json"), TEST_KEY.to_string());

        assert_eq!(storage.get("cred").await.unwrap(), None);

        storage.store("cred", &tokens("act.1")).await.unwrap();
        storage.store("other", &tokens("act.2")).await.unwrap();
        assert_eq!(storage.get("cred").await.unwrap(), Some(tokens("act.1")));

        storage.store("cred", &tokens("act.3")).await.unwrap();
        assert_eq!(storage.get("cred").await.unwrap(), Some(tokens("act.3")));

        storage.delete("cred").await.unwrap();
        assert_eq!(storage.get("cred").await.unwrap(), None);
        assert_eq!(storage.get("other").await.unwrap(), Some(tokens("act.2")));
    }

    #[tokio::test]
    async fn test_tokens_encrypted_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        let storage = FileStorage::new(path.clone(), TEST_KEY.to_string());

        storage.store("cred", &tokens("act.secret")).await.unwrap();

        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.contains("\"cred\""));
        assert!(!contents.contains("act.secret"));
    }

    #[tokio::test]
    async fn test_wrong_key_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        FileStorage::new(path.clone(), TEST_KEY.to_string())
            .store("cred", &tokens("act.1"))
            .await
            .unwrap();

        let other_key = "f".repeat(64);
        let err = FileStorage::new(path, other_key).get("cred").await.unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::Storage(StorageErrorKind::DecryptionFailed)
        );
    }
}
