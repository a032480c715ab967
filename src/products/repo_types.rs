use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Products with fewer units than this count as low stock.
pub const LOW_STOCK_THRESHOLD: i32 = 5;

/// Product row joined with its category names.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub name_ar: String,
    pub description: String,
    pub description_ar: String,
    pub price: Decimal,
    pub images: Vec<String>,
    pub stock: i32,
    pub featured: bool,
    pub active: bool,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub category_name_ar: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Product {
    pub fn stock_key(&self) -> &'static str {
        match self.stock {
            s if s <= 0 => "stock.out",
            s if s < LOW_STOCK_THRESHOLD => "stock.low",
            _ => "stock.in",
        }
    }
}
