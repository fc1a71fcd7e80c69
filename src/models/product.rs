use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub stock: i32,
    pub min_stock: i32,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub supplier: String,
    pub registered_at: DateTime<Utc>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.stock < self.min_stock
    }
}

/// Largest value a `NUMERIC(12,2)` price column holds.
pub const MAX_PRICE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Prices are stored with two decimals, half-way values rounded away from zero.
pub fn round_price(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Editable product fields, shared by the create and update paths.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub category: String,
    pub stock: i32,
    pub min_stock: i32,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub supplier: String,
}

impl ProductInput {
    /// Copy with both prices rounded to cents.
    pub fn normalized(&self) -> Self {
        Self {
            entry_price: round_price(self.entry_price),
            exit_price: round_price(self.exit_price),
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Name is required".to_string());
        }
        if self.category.trim().is_empty() {
            return Err("Category is required".to_string());
        }
        if self.supplier.trim().is_empty() {
            return Err("Supplier is required".to_string());
        }
        if self.stock < 0 || self.min_stock < 0 {
            return Err("Stock values cannot be negative".to_string());
        }
        if self.entry_price.is_sign_negative() || self.exit_price.is_sign_negative() {
            return Err("Prices cannot be negative".to_string());
        }
        if self.entry_price > MAX_PRICE || self.exit_price > MAX_PRICE {
            return Err(format!("Prices cannot exceed {MAX_PRICE}"));
        }
        Ok(())
    }
}

impl From<&Product> for ProductInput {
    fn from(p: &Product) -> Self {
        Self {
            name: p.name.clone(),
            category: p.category.clone(),
            stock: p.stock,
            min_stock: p.min_stock,
            entry_price: p.entry_price,
            exit_price: p.exit_price,
            supplier: p.supplier.clone(),
        }
    }
}
