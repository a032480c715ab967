use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::repo_types::CartLine;

const SELECT_LINES: &str = r#"
    SELECT ci.product_id, ci.quantity, p.name, p.name_ar, p.price, p.images, p.stock, p.active
      FROM cart_items ci
      JOIN products p ON p.id = ci.product_id
     WHERE ci.user_id = $1
     ORDER BY ci.created_at ASC
"#;

pub async fn lines(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<CartLine>> {
    let rows = sqlx::query_as::<_, CartLine>(SELECT_LINES)
        .bind(user_id)
        .fetch_all(db)
        .await
        .context("list cart lines")?;
    Ok(rows)
}

pub async fn lines_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> anyhow::Result<Vec<CartLine>> {
    let rows = sqlx::query_as::<_, CartLine>(SELECT_LINES)
        .bind(user_id)
        .fetch_all(&mut **tx)
        .await
        .context("list cart lines")?;
    Ok(rows)
}

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: i32 = 9_999;

/// Add `quantity` of a product; an existing row is incremented, never duplicated.
/// Returns false, leaving the line untouched, when the sum would pass
/// [`MAX_LINE_QUANTITY`].
pub async fn add(
    db: &PgPool,
    user_id: Uuid,
    product_id: Uuid,
    quantity: i32,
) -> anyhow::Result<bool> {
    let res = sqlx::query(
        r#"
        INSERT INTO cart_items (user_id, product_id, quantity)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, product_id)
        DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity,
                      updated_at = now()
         WHERE cart_items.quantity::BIGINT + EXCLUDED.quantity <= $4
        "#,
    )
    .bind(user_id)
    .bind(product_id)
    .bind(quantity)
    .bind(MAX_LINE_QUANTITY as i64)
    .execute(db)
    .await
    .context("add cart item")?;
    Ok(res.rows_affected() > 0)
}

/// Set the quantity of an existing line. Returns false when there was no line.
pub async fn set_quantity(
    db: &PgPool,
    user_id: Uuid,
    product_id: Uuid,
    quantity: i32,
) -> anyhow::Result<bool> {
    let res = sqlx::query(
        r#"
        UPDATE cart_items
           SET quantity = $3, updated_at = now()
         WHERE user_id = $1 AND product_id = $2
        "#,
    )
    .bind(user_id)
    .bind(product_id)
    .bind(quantity)
    .execute(db)
    .await
    .context("update cart item")?;
    Ok(res.rows_affected() > 0)
}

pub async fn remove(db: &PgPool, user_id: Uuid, product_id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
        .bind(user_id)
        .bind(product_id)
        .execute(db)
        .await
        .context("remove cart item")?;
    Ok(res.rows_affected() > 0)
}

pub async fn clear(db: &PgPool, user_id: Uuid) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user_id)
        .execute(db)
        .await
        .context("clear cart")?;
    Ok(res.rows_affected())
}

pub async fn clear_tx(tx: &mut Transaction<'_, Postgres>, user_id: Uuid) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
        .bind(user_id)
        .execute(&mut **tx)
        .await
        .context("clear cart")?;
    Ok(res.rows_affected())
}
