use async_trait::async_trait;
use bytes::Bytes;
use serde_json::json;

use super::{validate_path, BlobStore, StorageError};

/// Client for a Supabase-storage compatible object API.
pub struct RemoteBlobStore {
    client: reqwest::Client,
    base_url: String,
    key: String,
    bucket: String,
}

impl RemoteBlobStore {
    pub fn new(base_url: String, key: String, bucket: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            key,
            bucket,
        }
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, path)
    }
}

async fn check_status(resp: reqwest::Response) -> Result<(), StorageError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let body = resp.text().await.unwrap_or_default();
    Err(StorageError::Http(format!("{status}: {body}")))
}

#[async_trait]
impl BlobStore for RemoteBlobStore {
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

        let resp = self
            .client
            .post(self.object_url(path))
            .bearer_auth(&self.key)
            .header("apikey", &self.key)
            .header("content-type", content_type)
            .header("cache-control", "max-age=3600")
            .header("x-upsert", if upsert { "true" } else { "false" })
            .body(bytes)
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::CONFLICT {
            return Err(StorageError::AlreadyExists(path.to_string()));
        }
        check_status(resp).await
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, path
        )
    }

    async fn delete(&self, paths: &[String]) -> Result<(), StorageError> {
        if paths.is_empty() {
            return Ok(());
        }

        let resp = self
            .client
            .delete(format!("{}/storage/v1/object/{}", self.base_url, self.bucket))
            .bearer_auth(&self.key)
            .header("apikey", &self.key)
            .json(&json!({ "prefixes": paths }))
            .send()
            .await?;

        check_status(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_follow_the_storage_api_layout() {
        let store = RemoteBlobStore::new(
            "https://abc.example.co".to_string(),
            "key".to_string(),
            "products".to_string(),
        );
        assert_eq!(
            store.object_url("products/a.png"),
            "https://abc.example.co/storage/v1/object/products/products/a.png"
        );
        assert_eq!(
            store.public_url("products/a.png"),
            "https://abc.example.co/storage/v1/object/public/products/products/a.png"
        );
    }

    #[test]
    fn trailing_slash_on_the_base_url_is_ignored() {
        let store = RemoteBlobStore::new(
            "https://abc.example.co//".to_string(),
            "key".to_string(),
            "products".to_string(),
        );
        assert_eq!(
            store.object_url("products/a.png"),
            "https://abc.example.co/storage/v1/object/products/products/a.png"
        );
        assert_eq!(
            store.public_url("products/a.png"),
            "https://abc.example.co/storage/v1/object/public/products/products/a.png"
        );
    }
}
