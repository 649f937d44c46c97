use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// Brand joined with its category name, for display.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BrandWithCategory {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    pub category_name: String,
    pub user_id: i64,
    pub created_at: OffsetDateTime,
}

const JOINED_COLUMNS: &str = r#"
    b.id, b.name, b.category_id, c.name AS category_name, b.user_id, b.created_at
"#;

pub async fn list_by_owner(db: &PgPool, owner_id: i64) -> anyhow::Result<Vec<BrandWithCategory>> {
    let rows = sqlx::query_as::<_, BrandWithCategory>(&format!(
        r#"
        SELECT {JOINED_COLUMNS}
        FROM brands b
        JOIN categories c ON c.id = b.category_id
        WHERE b.user_id = $1
        ORDER BY b.created_at DESC
        "#,
    ))
    .bind(owner_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn list_by_owner_and_category(
    db: &PgPool,
    owner_id: i64,
    category_id: i64,
) -> anyhow::Result<Vec<BrandWithCategory>> {
    let rows = sqlx::query_as::<_, BrandWithCategory>(&format!(
        r#"
        SELECT {JOINED_COLUMNS}
        FROM brands b
        JOIN categories c ON c.id = b.category_id
        WHERE b.user_id = $1 AND b.category_id = $2
        ORDER BY b.created_at DESC
        "#,
    ))
    .bind(owner_id)
    .bind(category_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn insert(
    db: &PgPool,
    name: &str,
    category_id: i64,
    owner_id: i64,
) -> Result<BrandWithCategory, sqlx::Error> {
    sqlx::query_as::<_, BrandWithCategory>(&format!(
        r#"
        WITH inserted AS (
            INSERT INTO brands (name, category_id, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, category_id, user_id, created_at
        )
        SELECT {JOINED_COLUMNS}
        FROM inserted b
        JOIN categories c ON c.id = b.category_id
        "#,
    ))
    .bind(name)
    .bind(category_id)
    .bind(owner_id)
    .fetch_one(db)
    .await
}

pub async fn update(
    db: &PgPool,
    id: i64,
    owner_id: i64,
    name: &str,
) -> Result<Option<BrandWithCategory>, sqlx::Error> {
    sqlx::query_as::<_, BrandWithCategory>(&format!(
        r#"
        WITH updated AS (
            UPDATE brands
            SET name = $3
            WHERE id = $1 AND user_id = $2
            RETURNING id, name, category_id, user_id, created_at
        )
        SELECT {JOINED_COLUMNS}
        FROM updated b
        JOIN categories c ON c.id = b.category_id
        "#,
    ))
    .bind(id)
    .bind(owner_id)
    .bind(name)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, id: i64, owner_id: i64) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM brands WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(owner_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}
