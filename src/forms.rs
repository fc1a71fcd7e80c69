//! Parsing of submitted form data (urlencoded and multipart).

use std::collections::HashMap;

use axum::http::HeaderMap;
use bytes::Bytes;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::inventory::catalog::ImageUpload;
use crate::models::{round_price, ProductInput};

#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub file: Option<ImageUpload>,
}

impl MultipartForm {
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }
}

/// Collect text fields plus at most one file from `file_field`. An empty
/// file input (no file chosen) yields `file: None`.
pub async fn parse_multipart(
    headers: &HeaderMap,
    body: Bytes,
    file_field: &str,
) -> Result<MultipartForm, String> {
    let boundary = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| "Missing multipart boundary".to_string())?;

    let stream = futures_util::stream::once(async { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut form = MultipartForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Multipart error: {e}"))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == file_field {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field
                .content_type()
                .map(|m| m.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let bytes = field
                .bytes()
                .await
                .map_err(|e| format!("File read error: {e}"))?;
            if !file_name.is_empty() && !bytes.is_empty() {
                form.file = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| format!("Field read error: {e}"))?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

fn parse_int(label: &str, raw: &str) -> Result<i32, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse()
        .map_err(|_| format!("{label} must be a whole number"))
}

fn parse_price(label: &str, raw: &str) -> Result<Decimal, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Decimal::ZERO);
    }
    raw.parse::<Decimal>()
        .map(round_price)
        .map_err(|_| format!("{label} must be a number"))
}

/// Build product fields from a submitted form. Blank numeric inputs count as 0.
pub fn product_input(fields: &HashMap<String, String>) -> Result<ProductInput, String> {
    let get = |name: &str| fields.get(name).map(String::as_str).unwrap_or("");
    Ok(ProductInput {
        name: get("name").trim().to_string(),
        category: get("category").trim().to_string(),
        stock: parse_int("Stock", get("stock"))?,
        min_stock: parse_int("Minimum stock", get("min_stock"))?,
        entry_price: parse_price("Entry price", get("entry_price"))?,
        exit_price: parse_price("Exit price", get("exit_price"))?,
        supplier: get("supplier").trim().to_string(),
    })
}

pub fn parse_quantity(raw: &str) -> Result<i32, String> {
    raw.trim()
        .parse()
        .map_err(|_| "Quantity must be a whole number".to_string())
}

pub fn parse_product_id(raw: &str) -> Result<Uuid, String> {
    if raw.trim().is_empty() {
        return Err("Select a product".to_string());
    }
    raw.trim()
        .parse()
        .map_err(|_| "Select a product".to_string())
}

/// `YYYY-MM-DD`; blank means today.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(today());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| "Invalid date".to_string())
}

/// Optional query-string values arrive as empty strings from filter forms.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
