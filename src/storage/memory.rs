use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use super::{validate_path, BlobStore, StorageError};

/// In-process store that records every delete call. Used by tests and for
/// running without persistent media.
pub struct MemoryBlobStore {
    bucket: String,
    objects: Mutex<HashMap<String, (Bytes, String)>>,
    deletes: Mutex<Vec<Vec<String>>>,
}

impl MemoryBlobStore {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            objects: Mutex::new(HashMap::new()),
            deletes: Mutex::new(Vec::new()),
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects
            .lock()
            .map(|objects| objects.contains_key(path))
            .unwrap_or(false)
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().map(|o| o.len()).unwrap_or(0)
    }

    /// Every `delete` call in order, with the paths it was given.
    pub fn delete_calls(&self) -> Vec<Vec<String>> {
        self.deletes.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn upload(
        &self,
        path: &str,
        bytes: Bytes,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), StorageError> {
        validate_path(path)?;
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| StorageError::Http("memory store poisoned".to_string()))?;
        if !upsert && objects.contains_key(path) {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }
        objects.insert(path.to_string(), (bytes, content_type.to_string()));
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("memory://{}/{}", self.bucket, path)
    }

    async fn delete(&self, paths: &[String]) -> Result<(), StorageError> {
        if let Ok(mut deletes) = self.deletes.lock() {
            deletes.push(paths.to_vec());
        }
        if let Ok(mut objects) = self.objects.lock() {
            for path in paths {
                objects.remove(path);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_delete_calls() {
        let store = MemoryBlobStore::new("products");
        store
            .upload("products/a.png", Bytes::from_static(b"x"), "image/png", false)
            .await
            .unwrap();
        assert!(store.contains("products/a.png"));

        store.delete(&["products/a.png".to_string()]).await.unwrap();
        assert!(!store.contains("products/a.png"));
        assert_eq!(store.delete_calls(), vec![vec!["products/a.png".to_string()]]);
    }

    #[test]
    fn public_url_round_trips_through_path_extraction() {
        let store = MemoryBlobStore::new("products");
        let url = store.public_url("products/a.png");
        assert_eq!(
            super::super::path_from_public_url(&url, "products").as_deref(),
            Some("products/a.png")
        );
    }
}
