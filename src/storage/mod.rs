//! Blob storage for product images.
//!
//! Handlers only see [`BlobStore`]; the concrete backend is picked from
//! configuration at start-up.

pub mod local;
pub mod memory;
pub mod remote;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::{StorageBackend, StorageConfig};

pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;
pub use remote::RemoteBlobStore;

/// Folder inside the bucket that holds product images.
pub const IMAGE_FOLDER: &str = "products";

#[derive(Debug)]
pub enum StorageError {
    AlreadyExists(String),
    InvalidPath(String),
    Io(std::io::Error),
    Http(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::AlreadyExists(path) => write!(f, "Object already exists: {path}"),
            StorageError::InvalidPath(path) => write!(f, "Invalid object path: {path}"),
            StorageError::Io(err) => write!(f, "Storage I/O error: {err}"),
            StorageError::Http(msg) => write!(f, "Storage request failed: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err)
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        StorageError::Http(err.to_string())
    }
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    fn bucket(&self) -> &str;

    /// Store `bytes` at `path`. With `upsert == false` an existing object is an error.
    async fn upload(
        &self,
        path: &str,
        bytes: Bytes,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), StorageError>;

    fn public_url(&self, path: &str) -> String;

    async fn delete(&self, paths: &[String]) -> Result<(), StorageError>;
}

pub fn from_config(config: &StorageConfig, base_url: &str) -> Arc<dyn BlobStore> {
    match &config.backend {
        StorageBackend::Local { dir } => Arc::new(LocalBlobStore::new(
            dir.clone(),
            config.bucket.clone(),
            format!("{}/media", base_url.trim_end_matches('/')),
        )),
        StorageBackend::Remote { url, key } => Arc::new(RemoteBlobStore::new(
            url.clone(),
            key.clone(),
            config.bucket.clone(),
        )),
    }
}

/// Object path for a freshly uploaded product image:
/// `products/{product_id}-{millis}.{ext}`.
pub fn image_object_path(product_id: uuid::Uuid, file_name: &str, millis: i64) -> String {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "bin".to_string());

    format!("{IMAGE_FOLDER}/{product_id}-{millis}.{ext}")
}

/// Recover the object path from a public URL: every segment after the first
/// segment equal to the bucket name.
pub fn path_from_public_url(url: &str, bucket: &str) -> Option<String> {
    let segments: Vec<&str> = url.split('/').collect();
    let idx = segments.iter().position(|s| *s == bucket)?;
    let path = segments[idx + 1..].join("/");
    if path.is_empty() { None } else { Some(path) }
}

/// Rejects absolute paths and parent-directory traversal.
pub(crate) fn validate_path(path: &str) -> Result<(), StorageError> {
    if path.is_empty()
        || path.starts_with('/')
        || path.split('/').any(|seg| seg.is_empty() || seg == "..")
    {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn image_path_uses_product_id_timestamp_and_extension() {
        let id = Uuid::nil();
        assert_eq!(
            image_object_path(id, "Photo.JPG", 1700000000000),
            format!("products/{id}-1700000000000.jpg")
        );
    }

    #[test]
    fn image_path_falls_back_when_extension_is_odd() {
        let id = Uuid::nil();
        assert!(image_object_path(id, "noext", 1).ends_with(".bin"));
        assert!(image_object_path(id, "evil.p/ng", 1).ends_with(".bin"));
    }

    #[test]
    fn path_is_recovered_from_remote_public_url() {
        let url = "https://abc.example.co/storage/v1/object/public/products/products/x-1.png";
        assert_eq!(
            path_from_public_url(url, "products").as_deref(),
            Some("products/x-1.png")
        );
    }

    #[test]
    fn path_is_recovered_from_local_public_url() {
        let url = "http://localhost:3000/media/products/products/x-1.png";
        assert_eq!(
            path_from_public_url(url, "products").as_deref(),
            Some("products/x-1.png")
        );
    }

    #[test]
    fn url_without_bucket_yields_none() {
        assert_eq!(path_from_public_url("https://cdn.example.com/a/b.png", "products"), None);
        assert_eq!(path_from_public_url("https://cdn.example.com/products", "products"), None);
    }

    #[test]
    fn traversal_paths_are_rejected() {
        assert!(validate_path("products/a.png").is_ok());
        assert!(validate_path("../etc/passwd").is_err());
        assert!(validate_path("/abs.png").is_err());
        assert!(validate_path("products//a.png").is_err());
    }
}
