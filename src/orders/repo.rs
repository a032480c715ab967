use anyhow::Context;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::repo_types::{Order, OrderItem, OrderStatus};
use crate::cart::pricing::Totals;

const ORDER_COLUMNS: &str = r#"
    id, user_id, customer_name, customer_email, customer_phone, address_line, city,
    country, postal_code, subtotal, tax, shipping, total, status, created_at, updated_at
"#;

pub struct NewOrder<'a> {
    pub user_id: Option<Uuid>,
    pub customer_name: &'a str,
    pub customer_email: &'a str,
    pub customer_phone: Option<&'a str>,
    pub address_line: &'a str,
    pub city: &'a str,
    pub country: &'a str,
    pub postal_code: Option<&'a str>,
    pub totals: Totals,
}

pub struct NewOrderItem<'a> {
    pub product_id: Uuid,
    pub product_name: &'a str,
    pub product_name_ar: &'a str,
    pub unit_price: Decimal,
    pub quantity: i32,
}

pub async fn insert_tx(
    tx: &mut Transaction<'_, Postgres>,
    new: &NewOrder<'_>,
) -> anyhow::Result<Order> {
    let order = sqlx::query_as::<_, Order>(&format!(
        r#"
        INSERT INTO orders
            (user_id, customer_name, customer_email, customer_phone, address_line, city,
             country, postal_code, subtotal, tax, shipping, total)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING {ORDER_COLUMNS}
        "#
    ))
    .bind(new.user_id)
    .bind(new.customer_name)
    .bind(new.customer_email)
    .bind(new.customer_phone)
    .bind(new.address_line)
    .bind(new.city)
    .bind(new.country)
    .bind(new.postal_code)
    .bind(new.totals.subtotal)
    .bind(new.totals.tax)
    .bind(new.totals.shipping)
    .bind(new.totals.total)
    .fetch_one(&mut **tx)
    .await
    .context("insert order")?;
    Ok(order)
}

pub async fn insert_item_tx(
    tx: &mut Transaction<'_, Postgres>,
    order_id: Uuid,
    item: &NewOrderItem<'_>,
) -> anyhow::Result<OrderItem> {
    let row = sqlx::query_as::<_, OrderItem>(
        r#"
        INSERT INTO order_items (order_id, product_id, product_name, product_name_ar, unit_price, quantity)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, order_id, product_id, product_name, product_name_ar, unit_price, quantity
        "#,
    )
    .bind(order_id)
    .bind(item.product_id)
    .bind(item.product_name)
    .bind(item.product_name_ar)
    .bind(item.unit_price)
    .bind(item.quantity)
    .fetch_one(&mut **tx)
    .await
    .context("insert order item")?;
    Ok(row)
}

pub async fn get(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Order>> {
    let row = sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("get order")?;
    Ok(row)
}

pub async fn items(db: &PgPool, order_id: Uuid) -> anyhow::Result<Vec<OrderItem>> {
    let rows = sqlx::query_as::<_, OrderItem>(
        r#"
        SELECT id, order_id, product_id, product_name, product_name_ar, unit_price, quantity
          FROM order_items
         WHERE order_id = $1
         ORDER BY product_name ASC
        "#,
    )
    .bind(order_id)
    .fetch_all(db)
    .await
    .context("list order items")?;
    Ok(rows)
}

pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<Order>> {
    let rows = sqlx::query_as::<_, Order>(&format!(
        r#"
        SELECT {ORDER_COLUMNS}
          FROM orders
         WHERE user_id = $1
         ORDER BY created_at DESC
         LIMIT $2 OFFSET $3
        "#
    ))
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
    .context("list orders by user")?;
    Ok(rows)
}

pub async fn list_all(
    db: &PgPool,
    status: Option<OrderStatus>,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<Order>> {
    let rows = sqlx::query_as::<_, Order>(&format!(
        r#"
        SELECT {ORDER_COLUMNS}
          FROM orders
         WHERE ($1::order_status IS NULL OR status = $1)
         ORDER BY created_at DESC
         LIMIT $2 OFFSET $3
        "#
    ))
    .bind(status)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
    .context("list orders")?;
    Ok(rows)
}

pub async fn set_status(
    db: &PgPool,
    id: Uuid,
    status: OrderStatus,
) -> anyhow::Result<Option<Order>> {
    let row = sqlx::query_as::<_, Order>(&format!(
        r#"
        UPDATE orders
           SET status = $2, updated_at = now()
         WHERE id = $1
        RETURNING {ORDER_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(status)
    .fetch_optional(db)
    .await
    .context("update order status")?;
    Ok(row)
}
