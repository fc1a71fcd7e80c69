//! Product create/update/delete, including the image side effects.
//!
//! Row writes and blob operations are independent calls: a failed image
//! upload after a successful insert leaves the product without an image
//! rather than failing the request.

use bytes::Bytes;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::AppError;
use crate::models::{Product, ProductInput};
use crate::storage::{self, BlobStore, StorageError};

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl ImageUpload {
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.content_type.starts_with("image/") {
            return Err(AppError::BadRequest(
                "The product image must be an image file".to_string(),
            ));
        }
        Ok(())
    }
}

/// Upload the image and return its public URL.
pub async fn store_image(
    store: &dyn BlobStore,
    product_id: Uuid,
    image: ImageUpload,
) -> Result<String, StorageError> {
    let path = storage::image_object_path(
        product_id,
        &image.file_name,
        Utc::now().timestamp_millis(),
    );
    store
        .upload(&path, image.bytes, &image.content_type, false)
        .await?;
    Ok(store.public_url(&path))
}

/// Delete the blob behind a stored public URL. Returns `false` when the
/// URL does not point into the bucket.
pub async fn remove_image(store: &dyn BlobStore, image_url: &str) -> Result<bool, StorageError> {
    let Some(path) = storage::path_from_public_url(image_url, store.bucket()) else {
        tracing::warn!(image_url, "Image URL is outside the storage bucket");
        return Ok(false);
    };
    store.delete(&[path]).await?;
    Ok(true)
}

pub async fn create_product(
    pool: &PgPool,
    store: &dyn BlobStore,
    input: &ProductInput,
    image: Option<ImageUpload>,
) -> Result<Product, AppError> {
    let input = input.normalized();
    input.validate().map_err(AppError::BadRequest)?;
    if let Some(image) = &image {
        image.validate()?;
    }

    let mut product = db::products::create(pool, &input).await?;
    tracing::info!(product_id = %product.id, name = %product.name, "Product created");

    if let Some(image) = image {
        match store_image(store, product.id, image).await {
            Ok(url) => match db::products::set_image_url(pool, product.id, Some(&url)).await {
                Ok(()) => product.image_url = Some(url),
                Err(e) => {
                    tracing::error!(product_id = %product.id, "Failed to save image URL: {e}")
                }
            },
            Err(e) => tracing::error!(product_id = %product.id, "Failed to upload image: {e}"),
        }
    }

    Ok(product)
}

pub async fn update_product(
    pool: &PgPool,
    store: &dyn BlobStore,
    id: Uuid,
    input: &ProductInput,
    image: Option<ImageUpload>,
) -> Result<Product, AppError> {
    let input = input.normalized();
    input.validate().map_err(AppError::BadRequest)?;
    if let Some(image) = &image {
        image.validate()?;
    }

    let existing = db::products::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let mut image_url = existing.image_url.clone();
    if let Some(image) = image {
        if let Some(old) = &existing.image_url {
            if let Err(e) = remove_image(store, old).await {
                tracing::error!(product_id = %id, "Failed to delete previous image: {e}");
            }
        }
        match store_image(store, id, image).await {
            Ok(url) => image_url = Some(url),
            Err(e) => tracing::error!(product_id = %id, "Failed to upload image: {e}"),
        }
    }

    let product = db::products::update(pool, id, &input, image_url.as_deref())
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::NotFound("Product not found".to_string()),
            _ => AppError::Database(e),
        })?;

    tracing::info!(product_id = %id, "Product updated");
    Ok(product)
}

/// Replace only the image of an existing product. No other column is written.
pub async fn replace_image(
    pool: &PgPool,
    store: &dyn BlobStore,
    id: Uuid,
    image: ImageUpload,
) -> Result<Product, AppError> {
    image.validate()?;
    let existing = db::products::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    if let Some(old) = &existing.image_url {
        if let Err(e) = remove_image(store, old).await {
            tracing::error!(product_id = %id, "Failed to delete previous image: {e}");
        }
    }
    let url = store_image(store, id, image).await?;
    db::products::set_image_url(pool, id, Some(&url)).await?;
    tracing::info!(product_id = %id, "Product image replaced");

    db::products::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

/// Removes the product row and, when it had an image, issues one blob delete.
pub async fn delete_product(
    pool: &PgPool,
    store: &dyn BlobStore,
    id: Uuid,
) -> Result<(), AppError> {
    let product = db::products::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    if db::products::delete(pool, id).await? == 0 {
        return Err(AppError::NotFound("Product not found".to_string()));
    }
    tracing::info!(product_id = %id, "Product deleted");

    if let Some(url) = &product.image_url {
        if let Err(e) = remove_image(store, url).await {
            tracing::error!(product_id = %id, "Failed to delete product image: {e}");
        }
    }

    Ok(())
}
