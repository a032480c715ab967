use anyhow::Context;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::repo_types::Product;

const SELECT_PRODUCT: &str = r#"
    SELECT p.id, p.name, p.name_ar, p.description, p.description_ar, p.price, p.images,
           p.stock, p.featured, p.active, p.category_id, p.created_at, p.updated_at,
           c.name AS category_name, c.name_ar AS category_name_ar
      FROM products p
      LEFT JOIN categories c ON c.id = p.category_id
"#;

pub struct NewProduct<'a> {
    pub name: &'a str,
    pub name_ar: &'a str,
    pub description: &'a str,
    pub description_ar: &'a str,
    pub price: Decimal,
    pub images: &'a [String],
    pub stock: i32,
    pub featured: bool,
    pub active: bool,
    pub category_id: Option<Uuid>,
}

/// Partial update. `category_id: Some(None)` detaches the product.
#[derive(Default)]
pub struct ProductChanges<'a> {
    pub name: Option<&'a str>,
    pub name_ar: Option<&'a str>,
    pub description: Option<&'a str>,
    pub description_ar: Option<&'a str>,
    pub price: Option<Decimal>,
    pub images: Option<&'a [String]>,
    pub stock: Option<i32>,
    pub featured: Option<bool>,
    pub active: Option<bool>,
    pub category_id: Option<Option<Uuid>>,
}

pub async fn list(db: &PgPool, include_inactive: bool) -> anyhow::Result<Vec<Product>> {
    let rows = sqlx::query_as::<_, Product>(&format!(
        "{SELECT_PRODUCT} WHERE ($1 OR p.active) ORDER BY p.created_at DESC"
    ))
    .bind(include_inactive)
    .fetch_all(db)
    .await
    .context("list products")?;
    Ok(rows)
}

pub async fn get(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Product>> {
    let row = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} WHERE p.id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("get product")?;
    Ok(row)
}

/// Lock and load the given products inside a transaction, for order pricing.
pub async fn get_many_tx(
    tx: &mut Transaction<'_, Postgres>,
    ids: &[Uuid],
) -> anyhow::Result<Vec<Product>> {
    let rows = sqlx::query_as::<_, Product>(&format!(
        "{SELECT_PRODUCT} WHERE p.id = ANY($1) FOR SHARE OF p"
    ))
    .bind(ids)
    .fetch_all(&mut **tx)
    .await
    .context("load products for order")?;
    Ok(rows)
}

pub async fn low_stock(db: &PgPool, threshold: i32) -> anyhow::Result<Vec<Product>> {
    let rows = sqlx::query_as::<_, Product>(&format!(
        "{SELECT_PRODUCT} WHERE p.active AND p.stock < $1 ORDER BY p.stock ASC, p.name ASC"
    ))
    .bind(threshold)
    .fetch_all(db)
    .await
    .context("low stock products")?;
    Ok(rows)
}

pub async fn create(db: &PgPool, new: &NewProduct<'_>) -> anyhow::Result<Product> {
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO products
            (name, name_ar, description, description_ar, price, images, stock,
             featured, active, category_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id
        "#,
    )
    .bind(new.name)
    .bind(new.name_ar)
    .bind(new.description)
    .bind(new.description_ar)
    .bind(new.price)
    .bind(new.images)
    .bind(new.stock)
    .bind(new.featured)
    .bind(new.active)
    .bind(new.category_id)
    .fetch_one(db)
    .await
    .context("insert product")?;

    get(db, id).await?.context("product vanished after insert")
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    changes: &ProductChanges<'_>,
) -> anyhow::Result<Option<Product>> {
    let res = sqlx::query(
        r#"
        UPDATE products
           SET name           = COALESCE($2, name),
               name_ar        = COALESCE($3, name_ar),
               description    = COALESCE($4, description),
               description_ar = COALESCE($5, description_ar),
               price          = COALESCE($6, price),
               images         = COALESCE($7, images),
               stock          = COALESCE($8, stock),
               featured       = COALESCE($9, featured),
               active         = COALESCE($10, active),
               category_id    = CASE WHEN $11 THEN $12 ELSE category_id END,
               updated_at     = now()
         WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(changes.name)
    .bind(changes.name_ar)
    .bind(changes.description)
    .bind(changes.description_ar)
    .bind(changes.price)
    .bind(changes.images)
    .bind(changes.stock)
    .bind(changes.featured)
    .bind(changes.active)
    .bind(changes.category_id.is_some())
    .bind(changes.category_id.flatten())
    .execute(db)
    .await
    .context("update product")?;

    if res.rows_affected() == 0 {
        return Ok(None);
    }
    get(db, id).await
}

pub async fn append_image(db: &PgPool, id: Uuid, key: &str) -> anyhow::Result<bool> {
    let res = sqlx::query(
        "UPDATE products SET images = array_append(images, $2), updated_at = now() WHERE id = $1",
    )
    .bind(id)
    .bind(key)
    .execute(db)
    .await
    .context("append product image")?;
    Ok(res.rows_affected() > 0)
}

/// Delete a product, returning its image list when it existed.
pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Vec<String>>> {
    let images: Option<Vec<String>> =
        sqlx::query_scalar("DELETE FROM products WHERE id = $1 RETURNING images")
            .bind(id)
            .fetch_optional(db)
            .await
            .context("delete product")?;
    Ok(images)
}
