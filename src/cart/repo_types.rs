use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Cart row joined with the current product data.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartLine {
    pub product_id: Uuid,
    pub quantity: i32,
    pub name: String,
    pub name_ar: String,
    pub price: Decimal,
    pub images: Vec<String>,
    pub stock: i32,
    pub active: bool,
}
