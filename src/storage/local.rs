use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;

use super::{validate_path, BlobStore, StorageError};

/// Stores objects under `{root}/{bucket}/{path}`; `/media` serves `root`.
pub struct LocalBlobStore {
    root: PathBuf,
    bucket: String,
    public_base: String,
}

impl LocalBlobStore {
    pub fn new(root: PathBuf, bucket: String, public_base: String) -> Self {
        Self {
            root,
            bucket,
            public_base,
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn object_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        validate_path(path)?;
        Ok(self.root.join(&self.bucket).join(path))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn upload(
        &self,
        path: &str,
        bytes: Bytes,
        _content_type: &str,
        upsert: bool,
    ) -> Result<(), StorageError> {
        let target = self.object_path(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true);
        if upsert {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }

        let mut file = options.open(&target).await.map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => StorageError::AlreadyExists(path.to_string()),
            _ => StorageError::Io(e),
        })?;
        file.write_all(&bytes).await?;
        file.flush().await?;

        tracing::debug!(path, size = bytes.len(), "Stored object locally");
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.public_base, self.bucket, path)
    }

    async fn delete(&self, paths: &[String]) -> Result<(), StorageError> {
        for path in paths {
            let target = self.object_path(path)?;
            match tokio::fs::remove_file(&target).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::warn!(path = %path, "Object already missing on delete");
                }
                Err(e) => return Err(StorageError::Io(e)),
            }
        }
        Ok(())
    }
}
