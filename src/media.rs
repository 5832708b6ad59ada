//! # Media Relocation
//!
//! Uploads land in `venues/temp` until the owning venue exists, then move to
//! `venues/{venueId}`. Relocation errors are returned to the caller, which
//! decides whether to fall back to the original URL.

use std::sync::Arc;

use thiserror::Error;

use crate::integrations::{ObjectStorage, StoredObject, UploadObject, UpstreamError};

/// Namespace for media uploaded before its venue has an id
pub const TEMP_NAMESPACE: &str = "temp";
const ROOT_FOLDER: &str = "venues";

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("no file provided")]
    Empty,
    #[error("file is {size} bytes, the limit is {limit}")]
    TooLarge { size: usize, limit: usize },
    #[error("namespace '{0}' may only contain letters, digits, '-' and '_'")]
    InvalidNamespace(String),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// An uploaded file as received from the client
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct MediaService {
    storage: Arc<dyn ObjectStorage>,
    max_upload_bytes: usize,
}

/// Folder for a namespace, e.g. `venues/temp`
pub fn folder_for(namespace: &str) -> String {
    format!("{ROOT_FOLDER}/{namespace}")
}

/// True when `storage_key` lives under the temporary namespace
pub fn is_temporary(storage_key: &str) -> bool {
    storage_key
        .strip_prefix(ROOT_FOLDER)
        .and_then(|rest| rest.strip_prefix('/'))
        .and_then(|rest| rest.strip_prefix(TEMP_NAMESPACE))
        .is_some_and(|rest| rest.starts_with('/'))
}

/// Final path segment of a storage key
pub fn file_name(storage_key: &str) -> &str {
    storage_key.rsplit('/').next().unwrap_or(storage_key)
}

fn check_namespace(namespace: &str) -> Result<(), MediaError> {
    let valid = !namespace.is_empty()
        && namespace.len() <= 64
        && namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(MediaError::InvalidNamespace(namespace.to_string()))
    }
}

impl MediaService {
    pub fn new(storage: Arc<dyn ObjectStorage>, max_upload_bytes: usize) -> Self {
        Self {
            storage,
            max_upload_bytes,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Stores `file` under `venues/{namespace}`, defaulting to the temporary namespace.
    pub async fn upload(
        &self,
        file: IncomingFile,
        namespace: Option<&str>,
    ) -> Result<StoredObject, MediaError> {
        if file.bytes.is_empty() {
            return Err(MediaError::Empty);
        }
        if file.bytes.len() > self.max_upload_bytes {
            return Err(MediaError::TooLarge {
                size: file.bytes.len(),
                limit: self.max_upload_bytes,
            });
        }

        let namespace = namespace.unwrap_or(TEMP_NAMESPACE);
        check_namespace(namespace)?;

        let stored = self
            .storage
            .upload(UploadObject {
                folder: folder_for(namespace),
                file_name: file.file_name,
                content_type: file.content_type,
                bytes: file.bytes,
            })
            .await?;

        tracing::info!(storage_key = %stored.storage_key, namespace, "Stored media upload");
        Ok(stored)
    }

    /// Moves `storage_key` into `venues/{to_namespace}`, keeping its file name.
    pub async fn relocate(
        &self,
        storage_key: &str,
        to_namespace: &str,
    ) -> Result<StoredObject, UpstreamError> {
        let target = format!("{}/{}", folder_for(to_namespace), file_name(storage_key));
        let moved = self.storage.rename(storage_key, &target).await?;
        tracing::debug!(from = storage_key, to = %moved.storage_key, "Relocated media");
        Ok(moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStorage {
        renames: Mutex<Vec<(String, String)>>,
        uploads: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ObjectStorage for RecordingStorage {
        async fn upload(&self, object: UploadObject) -> Result<StoredObject, UpstreamError> {
            let key = format!("{}/{}", object.folder, object.file_name);
            self.uploads.lock().unwrap().push(key.clone());
            Ok(StoredObject {
                url: format!("https://cdn.test/{key}"),
                storage_key: key,
            })
        }

        async fn rename(&self, from: &str, to: &str) -> Result<StoredObject, UpstreamError> {
            self.renames
                .lock()
                .unwrap()
                .push((from.to_string(), to.to_string()));
            Ok(StoredObject {
                url: format!("https://cdn.test/{to}"),
                storage_key: to.to_string(),
            })
        }
    }

    fn file(len: usize) -> IncomingFile {
        IncomingFile {
            file_name: "pitch.jpg".to_string(),
            content_type: Some("image/jpeg".to_string()),
            bytes: vec![7; len],
        }
    }

    #[test]
    fn temporary_keys_are_detected() {
        assert!(is_temporary("venues/temp/abc123"));
        assert!(!is_temporary("venues/temporary/abc123"));
        assert!(!is_temporary("venues/5f1c/abc123"));
        assert!(!is_temporary("temp/abc123"));
        assert_eq!(file_name("venues/temp/abc123"), "abc123");
        assert_eq!(file_name("abc123"), "abc123");
    }

    #[tokio::test]
    async fn upload_defaults_to_temp_namespace() {
        let storage = Arc::new(RecordingStorage::default());
        let media = MediaService::new(storage.clone(), 1024);

        let stored = media.upload(file(10), None).await.unwrap();
        assert_eq!(stored.storage_key, "venues/temp/pitch.jpg");

        let stored = media.upload(file(10), Some("venue-1")).await.unwrap();
        assert_eq!(stored.storage_key, "venues/venue-1/pitch.jpg");
    }

    #[tokio::test]
    async fn upload_limits_are_enforced() {
        let media = MediaService::new(Arc::new(RecordingStorage::default()), 8);

        assert!(matches!(
            media.upload(file(0), None).await,
            Err(MediaError::Empty)
        ));
        assert!(matches!(
            media.upload(file(9), None).await,
            Err(MediaError::TooLarge { size: 9, limit: 8 })
        ));
        assert!(matches!(
            media.upload(file(1), Some("../etc")).await,
            Err(MediaError::InvalidNamespace(_))
        ));
    }

    #[tokio::test]
    async fn relocate_keeps_file_name() {
        let storage = Arc::new(RecordingStorage::default());
        let media = MediaService::new(storage.clone(), 1024);

        let moved = media.relocate("venues/temp/abc123", "venue-9").await.unwrap();
        assert_eq!(moved.storage_key, "venues/venue-9/abc123");
        assert_eq!(
            storage.renames.lock().unwrap().as_slice(),
            &[(
                "venues/temp/abc123".to_string(),
                "venues/venue-9/abc123".to_string()
            )]
        );
    }
}
