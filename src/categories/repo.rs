use anyhow::Context;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::repo_types::Category;

const SELECT_WITH_COUNT: &str = r#"
    SELECT c.id, c.name, c.name_ar, c.description, c.description_ar, c.created_at,
           COUNT(p.id) AS product_count
      FROM categories c
      LEFT JOIN products p ON p.category_id = c.id
"#;

pub struct NewCategory<'a> {
    pub name: &'a str,
    pub name_ar: &'a str,
    pub description: Option<&'a str>,
    pub description_ar: Option<&'a str>,
}

#[derive(Default)]
pub struct CategoryChanges<'a> {
    pub name: Option<&'a str>,
    pub name_ar: Option<&'a str>,
    pub description: Option<&'a str>,
    pub description_ar: Option<&'a str>,
}

pub async fn list(db: &PgPool) -> anyhow::Result<Vec<Category>> {
    let rows = sqlx::query_as::<_, Category>(&format!(
        "{SELECT_WITH_COUNT} GROUP BY c.id ORDER BY c.name ASC"
    ))
    .fetch_all(db)
    .await
    .context("list categories")?;
    Ok(rows)
}

pub async fn get(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Category>> {
    let row = sqlx::query_as::<_, Category>(&format!(
        "{SELECT_WITH_COUNT} WHERE c.id = $1 GROUP BY c.id"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
    .context("get category")?;
    Ok(row)
}

pub async fn exists(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let found: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await
        .context("category exists")?;
    Ok(found.is_some())
}

pub async fn create(db: &PgPool, new: &NewCategory<'_>) -> anyhow::Result<Category> {
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO categories (name, name_ar, description, description_ar)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(new.name)
    .bind(new.name_ar)
    .bind(new.description)
    .bind(new.description_ar)
    .fetch_one(db)
    .await
    .context("insert category")?;

    get(db, id)
        .await?
        .context("category vanished after insert")
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    changes: &CategoryChanges<'_>,
) -> anyhow::Result<Option<Category>> {
    let res = sqlx::query(
        r#"
        UPDATE categories
           SET name           = COALESCE($2, name),
               name_ar        = COALESCE($3, name_ar),
               description    = COALESCE($4, description),
               description_ar = COALESCE($5, description_ar)
         WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(changes.name)
    .bind(changes.name_ar)
    .bind(changes.description)
    .bind(changes.description_ar)
    .execute(db)
    .await
    .context("update category")?;

    if res.rows_affected() == 0 {
        return Ok(None);
    }
    get(db, id).await
}

/// Delete a category after detaching its products. Returns the number of
/// detached products, or `None` when the category did not exist.
pub async fn delete_detaching_products(db: &PgPool, id: Uuid) -> anyhow::Result<Option<u64>> {
    let mut tx = db.begin().await.context("begin tx")?;

    let detached = sqlx::query("UPDATE products SET category_id = NULL WHERE category_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("detach products")?
        .rows_affected();

    let deleted = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("delete category")?
        .rows_affected();

    if deleted == 0 {
        tx.rollback().await.context("rollback tx")?;
        return Ok(None);
    }
    tx.commit().await.context("commit tx")?;
    debug!(category_id = %id, detached, "category deleted");
    Ok(Some(detached))
}
