use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Entry,
    Exit,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Entry => "entry",
            MovementKind::Exit => "exit",
        }
    }
}

impl fmt::Display for MovementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entry" => Ok(MovementKind::Entry),
            "exit" => Ok(MovementKind::Exit),
            other => Err(format!("Unknown movement kind: {other}")),
        }
    }
}

/// Append-only stock movement. There is no update or delete path, and
/// `product_id` may outlive the product it names.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Movement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub kind: String,
    pub quantity: i32,
    pub reason: String,
    pub responsible: Uuid,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Movement joined with the product name and the responsible user's profile name.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct MovementRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub kind: String,
    pub quantity: i32,
    pub reason: String,
    pub responsible: Uuid,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub product_name: Option<String>,
    pub responsible_name: Option<String>,
}

impl MovementRow {
    pub fn is_entry(&self) -> bool {
        self.kind == MovementKind::Entry.as_str()
    }

    pub fn sign(&self) -> &'static str {
        if self.is_entry() { "+" } else { "-" }
    }

    pub fn product_label(&self) -> &str {
        self.product_name.as_deref().unwrap_or("Product not found")
    }

    pub fn responsible_label(&self) -> &str {
        self.responsible_name.as_deref().unwrap_or("Unknown user")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMovement {
    pub product_id: Uuid,
    pub quantity: i32,
    pub reason: String,
    pub date: Option<NaiveDate>,
}
