use crate::auth::repo_types::{Role, User};
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str =
    "id, name, name_ar, email, password_hash, role, avatar, created_at";

/// Fields a user or an admin may change on a profile. `None` keeps the stored value.
#[derive(Debug, Default)]
pub struct UserChanges<'a> {
    pub name: Option<&'a str>,
    pub name_ar: Option<&'a str>,
    pub avatar: Option<&'a str>,
    pub role: Option<Role>,
}

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Find a user by id.
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new client with hashed password. `None` when the email is taken.
    pub async fn create(
        db: &PgPool,
        name: &str,
        name_ar: Option<&str>,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<User>> {
        let res = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, name_ar, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(name_ar)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await;
        match res {
            Ok(user) => Ok(Some(user)),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list(db: &PgPool, limit: i64, offset: i64) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(users)
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        changes: &UserChanges<'_>,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET name    = COALESCE($2, name),
                   name_ar = COALESCE($3, name_ar),
                   avatar  = COALESCE($4, avatar),
                   role    = COALESCE($5, role)
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.name_ar)
        .bind(changes.avatar)
        .bind(changes.role)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Delete a user. Cart rows cascade; orders keep their snapshot with a null user.
    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = "./migrations")]
    async fn duplicate_email_is_reported_not_raised(pool: PgPool) {
        let first = User::create(&pool, "Omar", None, "omar@souq.test", "hash")
            .await
            .unwrap();
        assert!(first.is_some());

        let second = User::create(&pool, "Omar 2", None, "omar@souq.test", "hash")
            .await
            .unwrap();
        assert!(second.is_none());
    }
}
