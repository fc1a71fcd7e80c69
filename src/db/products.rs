use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::inventory::dashboard::StockSample;
use crate::models::{Product, ProductInput};

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Case-insensitive substring match on the name.
    pub search: Option<String>,
    pub category: Option<String>,
}

pub async fn list(pool: &PgPool, filter: &ProductFilter) -> Result<Vec<Product>, sqlx::Error> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM products WHERE TRUE");

    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND name ILIKE ").push_bind(format!("%{search}%"));
    }
    if let Some(category) = filter.category.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND category = ").push_bind(category.to_string());
    }
    qb.push(" ORDER BY name");

    qb.build_query_as::<Product>().fetch_all(pool).await
}

/// Lightweight (id, name) rows for select inputs.
pub async fn list_names(pool: &PgPool) -> Result<Vec<(Uuid, String)>, sqlx::Error> {
    sqlx::query_as("SELECT id, name FROM products ORDER BY name")
        .fetch_all(pool)
        .await
}

pub async fn categories(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT category FROM products WHERE category <> '' ORDER BY category",
    )
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}

/// Capped sample used for the dashboard aggregates.
pub async fn stock_sample(pool: &PgPool, limit: i64) -> Result<Vec<StockSample>, sqlx::Error> {
    sqlx::query_as::<_, StockSample>(
        "SELECT stock, min_stock, entry_price FROM products LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn create(pool: &PgPool, input: &ProductInput) -> Result<Product, sqlx::Error> {
    sqlx::query_as::<_, Product>(
        "INSERT INTO products (name, category, stock, min_stock, entry_price, exit_price, supplier, image_url, registered_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, NULL, now()) RETURNING *",
    )
    .bind(input.name.trim())
    .bind(input.category.trim())
    .bind(input.stock)
    .bind(input.min_stock)
    .bind(input.entry_price)
    .bind(input.exit_price)
    .bind(input.supplier.trim())
    .fetch_one(pool)
    .await
}

/// Writes the descriptive fields. `stock` is left alone: after creation it
/// only moves through `increment_stock` / `decrement_stock`.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    input: &ProductInput,
    image_url: Option<&str>,
) -> Result<Product, sqlx::Error> {
    sqlx::query_as::<_, Product>(
        "UPDATE products SET name = $2, category = $3, min_stock = $4,
                entry_price = $5, exit_price = $6, supplier = $7, image_url = $8, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(input.name.trim())
    .bind(input.category.trim())
    .bind(input.min_stock)
    .bind(input.entry_price)
    .bind(input.exit_price)
    .bind(input.supplier.trim())
    .bind(image_url)
    .fetch_one(pool)
    .await
}

pub async fn set_image_url(
    pool: &PgPool,
    id: Uuid,
    image_url: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE products SET image_url = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(image_url)
        .execute(pool)
        .await?;
    Ok(())
}

/// Returns the number of rows removed (0 or 1).
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Conditional increment. `None` when the product is gone or the sum would not fit in `INTEGER`.
pub async fn increment_stock<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    quantity: i32,
) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar::<_, i32>(
        "UPDATE products SET stock = stock + $2, updated_at = now()
         WHERE id = $1 AND stock <= 2147483647 - $2 RETURNING stock",
    )
    .bind(id)
    .bind(quantity)
    .fetch_optional(executor)
    .await
}

/// Conditional decrement. `None` when the product is gone or has fewer than `quantity` units.
pub async fn decrement_stock<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    quantity: i32,
) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar::<_, i32>(
        "UPDATE products SET stock = stock - $2, updated_at = now()
         WHERE id = $1 AND stock >= $2 RETURNING stock",
    )
    .bind(id)
    .bind(quantity)
    .fetch_optional(executor)
    .await
}
