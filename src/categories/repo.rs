use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
    pub created_at: OffsetDateTime,
}

pub async fn list_by_owner(db: &PgPool, owner_id: i64) -> anyhow::Result<Vec<Category>> {
    let rows = sqlx::query_as::<_, Category>(
        r#"
        SELECT id, name, user_id, created_at
        FROM categories
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(owner_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn insert(db: &PgPool, name: &str, owner_id: i64) -> Result<Category, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (name, user_id)
        VALUES ($1, $2)
        RETURNING id, name, user_id, created_at
        "#,
    )
    .bind(name)
    .bind(owner_id)
    .fetch_one(db)
    .await
}

/// Rename, matching both id and owner. `None` means no row matched, which
/// covers both a bad id and someone else's category.
pub async fn update(
    db: &PgPool,
    id: i64,
    owner_id: i64,
    name: &str,
) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        r#"
        UPDATE categories
        SET name = $3
        WHERE id = $1 AND user_id = $2
        RETURNING id, name, user_id, created_at
        "#,
    )
    .bind(id)
    .bind(owner_id)
    .bind(name)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, id: i64, owner_id: i64) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM categories WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(owner_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}
