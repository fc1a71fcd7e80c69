use std::collections::HashMap;

use askama::Template;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::auth::gate::STOCK_EDITORS;
use crate::db;
use crate::error::AppError;
use crate::forms;
use crate::inventory::catalog;
use crate::models::{Product, ProductInput};
use crate::routes::products::ListQuery;
use crate::state::SharedState;
use crate::views::{money, Nav};

#[derive(Template)]
#[template(path = "products/list.html")]
#[allow(dead_code)]
struct ProductListTemplate {
    nav: Nav,
    search: String,
    categories: Vec<CategoryOption>,
    products: Vec<ProductRow>,
}

#[allow(dead_code)]
struct CategoryOption {
    name: String,
    selected: bool,
}

#[allow(dead_code)]
struct ProductRow {
    id: String,
    name: String,
    category: String,
    stock: i32,
    min_stock: i32,
    entry_price: String,
    exit_price: String,
    supplier: String,
    image_url: Option<String>,
    low_stock: bool,
}

impl From<&Product> for ProductRow {
    fn from(p: &Product) -> Self {
        ProductRow {
            id: p.id.to_string(),
            name: p.name.clone(),
            category: p.category.clone(),
            stock: p.stock,
            min_stock: p.min_stock,
            entry_price: money(p.entry_price),
            exit_price: money(p.exit_price),
            supplier: p.supplier.clone(),
            image_url: p.image_url.clone(),
            low_stock: p.is_low_stock(),
        }
    }
}

#[derive(Template)]
#[template(path = "products/form.html")]
#[allow(dead_code)]
struct ProductFormTemplate {
    nav: Nav,
    title: String,
    action: String,
    editing: bool,
    values: FormValues,
    image_url: Option<String>,
    error: Option<String>,
}

/// Raw form values, echoed back when the form is re-rendered.
#[allow(dead_code)]
#[derive(Default)]
struct FormValues {
    name: String,
    category: String,
    stock: String,
    min_stock: String,
    entry_price: String,
    exit_price: String,
    supplier: String,
}

impl FormValues {
    fn from_fields(fields: &HashMap<String, String>) -> Self {
        let get = |name: &str| fields.get(name).cloned().unwrap_or_default();
        FormValues {
            name: get("name"),
            category: get("category"),
            stock: get("stock"),
            min_stock: get("min_stock"),
            entry_price: get("entry_price"),
            exit_price: get("exit_price"),
            supplier: get("supplier"),
        }
    }

    fn from_input(input: &ProductInput) -> Self {
        FormValues {
            name: input.name.clone(),
            category: input.category.clone(),
            stock: input.stock.to_string(),
            min_stock: input.min_stock.to_string(),
            entry_price: money(input.entry_price),
            exit_price: money(input.exit_price),
            supplier: input.supplier.clone(),
        }
    }
}

fn render_form(
    nav: Nav,
    product_id: Option<Uuid>,
    values: FormValues,
    image_url: Option<String>,
    error: Option<String>,
) -> Response {
    let (title, action) = match product_id {
        Some(id) => ("Edit product".to_string(), format!("/products/{id}/edit")),
        None => ("New product".to_string(), "/products/new".to_string()),
    };
    let template = ProductFormTemplate {
        nav,
        title,
        action,
        editing: product_id.is_some(),
        values,
        image_url,
        error,
    };
    Html(template.render().unwrap_or_default()).into_response()
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let profile = db::profiles::find_by_user(&state.pool, auth.user_id).await?;
    let search = query.search.clone().unwrap_or_default();
    let selected = query.category.clone().unwrap_or_default();

    let products = db::products::list(&state.pool, &query.into()).await?;
    let categories = db::products::categories(&state.pool)
        .await?
        .into_iter()
        .map(|name| CategoryOption {
            selected: name == selected,
            name,
        })
        .collect();

    let template = ProductListTemplate {
        nav: Nav::new(&auth, profile.as_ref()),
        search,
        categories,
        products: products.iter().map(ProductRow::from).collect(),
    };
    Ok(Html(template.render().unwrap_or_default()))
}

pub async fn new_page(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Response, AppError> {
    let profile = auth.require_role(&state.pool, STOCK_EDITORS).await?;
    let values = FormValues {
        stock: "0".to_string(),
        min_stock: "0".to_string(),
        ..Default::default()
    };
    Ok(render_form(Nav::new(&auth, Some(&profile)), None, values, None, None))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let profile = auth.require_role(&state.pool, STOCK_EDITORS).await?;
    let nav = Nav::new(&auth, Some(&profile));

    let form = match forms::parse_multipart(&headers, body, "image").await {
        Ok(form) => form,
        Err(msg) => return Ok(render_form(nav, None, FormValues::default(), None, Some(msg))),
    };
    let values = FormValues::from_fields(&form.fields);

    let input = match forms::product_input(&form.fields) {
        Ok(input) => input,
        Err(msg) => return Ok(render_form(nav, None, values, None, Some(msg))),
    };

    match catalog::create_product(&state.pool, state.storage.as_ref(), &input, form.file).await {
        Ok(_) => Ok(Redirect::to("/products").into_response()),
        Err(e) => Ok(render_form(nav, None, values, None, Some(e.user_message()))),
    }
}

pub async fn edit_page(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let profile = auth.require_role(&state.pool, STOCK_EDITORS).await?;
    let product = db::products::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(render_form(
        Nav::new(&auth, Some(&profile)),
        Some(id),
        FormValues::from_input(&ProductInput::from(&product)),
        product.image_url,
        None,
    ))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let profile = auth.require_role(&state.pool, STOCK_EDITORS).await?;
    let nav = Nav::new(&auth, Some(&profile));
    let product = db::products::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let form = match forms::parse_multipart(&headers, body, "image").await {
        Ok(form) => form,
        Err(msg) => {
            let values = FormValues::from_input(&ProductInput::from(&product));
            return Ok(render_form(nav, Some(id), values, product.image_url, Some(msg)));
        }
    };
    let values = FormValues::from_fields(&form.fields);

    let input = match forms::product_input(&form.fields) {
        Ok(input) => input,
        Err(msg) => return Ok(render_form(nav, Some(id), values, product.image_url, Some(msg))),
    };

    match catalog::update_product(&state.pool, state.storage.as_ref(), id, &input, form.file).await
    {
        Ok(_) => Ok(Redirect::to("/products").into_response()),
        Err(e) => Ok(render_form(
            nav,
            Some(id),
            values,
            product.image_url,
            Some(e.user_message()),
        )),
    }
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Redirect, AppError> {
    auth.require_role(&state.pool, STOCK_EDITORS).await?;
    catalog::delete_product(&state.pool, state.storage.as_ref(), id).await?;
    Ok(Redirect::to("/products"))
}
