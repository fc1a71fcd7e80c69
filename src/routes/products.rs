use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::auth::gate::STOCK_EDITORS;
use crate::db;
use crate::db::products::ProductFilter;
use crate::error::AppError;
use crate::forms;
use crate::inventory::catalog;
use crate::models::{Product, ProductInput};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}

impl From<ListQuery> for ProductFilter {
    fn from(q: ListQuery) -> Self {
        ProductFilter {
            search: forms::non_empty(&q.search).map(str::to_string),
            category: forms::non_empty(&q.category).map(str::to_string),
        }
    }
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = db::products::list(&state.pool, &query.into()).await?;
    Ok(Json(products))
}

pub async fn categories(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(db::products::categories(&state.pool).await?))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, AppError> {
    let product = db::products::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    Ok(Json(product))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>, AppError> {
    auth.require_role(&state.pool, STOCK_EDITORS).await?;
    let product = catalog::create_product(&state.pool, state.storage.as_ref(), &input, None).await?;
    Ok(Json(product))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>, AppError> {
    auth.require_role(&state.pool, STOCK_EDITORS).await?;
    let product =
        catalog::update_product(&state.pool, state.storage.as_ref(), id, &input, None).await?;
    Ok(Json(product))
}

/// Multipart body with a single `image` file field.
pub async fn upload_image(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Product>, AppError> {
    auth.require_role(&state.pool, STOCK_EDITORS).await?;

    let form = forms::parse_multipart(&headers, body, "image")
        .await
        .map_err(AppError::BadRequest)?;
    let image = form
        .file
        .ok_or_else(|| AppError::BadRequest("An image file is required".to_string()))?;

    let product = catalog::replace_image(&state.pool, state.storage.as_ref(), id, image).await?;
    Ok(Json(product))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth.require_role(&state.pool, STOCK_EDITORS).await?;
    catalog::delete_product(&state.pool, state.storage.as_ref(), id).await?;
    Ok(Json(serde_json::json!({ "message": "Deleted" })))
}
