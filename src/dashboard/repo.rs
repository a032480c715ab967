use anyhow::Context;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use crate::orders::{self, Order, OrderStatus};

#[derive(Debug, Clone, Copy, FromRow)]
pub struct Counts {
    pub products: i64,
    pub categories: i64,
    pub users: i64,
    pub orders: i64,
    pub revenue: Decimal,
}

pub async fn counts(db: &PgPool) -> anyhow::Result<Counts> {
    let row = sqlx::query_as::<_, Counts>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM products)   AS products,
            (SELECT COUNT(*) FROM categories) AS categories,
            (SELECT COUNT(*) FROM users)      AS users,
            (SELECT COUNT(*) FROM orders)     AS orders,
            (SELECT COALESCE(SUM(total), 0) FROM orders WHERE status <> 'cancelled') AS revenue
        "#,
    )
    .fetch_one(db)
    .await
    .context("dashboard counts")?;
    Ok(row)
}

pub async fn orders_by_status(db: &PgPool) -> anyhow::Result<Vec<(OrderStatus, i64)>> {
    let rows = sqlx::query_as::<_, (OrderStatus, i64)>(
        "SELECT status, COUNT(*) FROM orders GROUP BY status",
    )
    .fetch_all(db)
    .await
    .context("orders by status")?;
    Ok(rows)
}

pub async fn recent_orders(db: &PgPool, limit: i64) -> anyhow::Result<Vec<Order>> {
    orders::repo::list_all(db, None, limit, 0).await
}
