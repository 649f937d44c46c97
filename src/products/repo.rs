use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::products::dto::UpdateProductRequest;

/// Product joined with category and brand names. The names are read-only
/// denormalization for display and are never written back.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductWithRefs {
    pub id: i64,
    pub title: String,
    pub price: f64,
    pub description: String,
    pub keyword: String,
    pub image: Option<String>,
    pub category_id: i64,
    pub category_name: String,
    pub brand_id: i64,
    pub brand_name: String,
    pub user_id: i64,
    pub created_at: OffsetDateTime,
}

const JOINED_COLUMNS: &str = r#"
    p.id, p.title, p.price, p.description, p.keyword, p.image,
    p.category_id, c.name AS category_name,
    p.brand_id, b.name AS brand_name,
    p.user_id, p.created_at
"#;

fn joined_select(where_clause: &str) -> String {
    format!(
        r#"
        SELECT {JOINED_COLUMNS}
        FROM products p
        JOIN categories c ON c.id = p.category_id
        JOIN brands b ON b.id = p.brand_id
        {where_clause}
        ORDER BY p.created_at DESC
        "#,
    )
}

pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<ProductWithRefs>> {
    let rows = sqlx::query_as::<_, ProductWithRefs>(&joined_select(""))
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn list_by_owner(db: &PgPool, owner_id: i64) -> anyhow::Result<Vec<ProductWithRefs>> {
    let rows = sqlx::query_as::<_, ProductWithRefs>(&joined_select("WHERE p.user_id = $1"))
        .bind(owner_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn get_by_id(db: &PgPool, id: i64) -> anyhow::Result<Option<ProductWithRefs>> {
    let row = sqlx::query_as::<_, ProductWithRefs>(&joined_select("WHERE p.id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

/// Case-insensitive substring match over title, description and keyword.
pub async fn search(db: &PgPool, term: &str) -> anyhow::Result<Vec<ProductWithRefs>> {
    let pattern = format!("%{term}%");
    let rows = sqlx::query_as::<_, ProductWithRefs>(&joined_select(
        "WHERE p.title ILIKE $1 OR p.description ILIKE $1 OR p.keyword ILIKE $1",
    ))
    .bind(pattern)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn list_by_category(
    db: &PgPool,
    category_id: i64,
) -> anyhow::Result<Vec<ProductWithRefs>> {
    let rows = sqlx::query_as::<_, ProductWithRefs>(&joined_select("WHERE p.category_id = $1"))
        .bind(category_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn list_by_brand(db: &PgPool, brand_id: i64) -> anyhow::Result<Vec<ProductWithRefs>> {
    let rows = sqlx::query_as::<_, ProductWithRefs>(&joined_select("WHERE p.brand_id = $1"))
        .bind(brand_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

#[allow(clippy::too_many_arguments)]
pub async fn insert(
    db: &PgPool,
    title: &str,
    price: f64,
    description: &str,
    keyword: &str,
    image: &str,
    category_id: i64,
    brand_id: i64,
    owner_id: i64,
) -> Result<ProductWithRefs, sqlx::Error> {
    sqlx::query_as::<_, ProductWithRefs>(&format!(
        r#"
        WITH inserted AS (
            INSERT INTO products
                (title, price, description, keyword, image, category_id, brand_id, user_id)
            VALUES ($1, $2, $3, $4, NULLIF($5, ''), $6, $7, $8)
            RETURNING id, title, price, description, keyword, image,
                      category_id, brand_id, user_id, created_at
        )
        SELECT {JOINED_COLUMNS}
        FROM inserted p
        JOIN categories c ON c.id = p.category_id
        JOIN brands b ON b.id = p.brand_id
        "#,
    ))
    .bind(title)
    .bind(price)
    .bind(description)
    .bind(keyword)
    .bind(image)
    .bind(category_id)
    .bind(brand_id)
    .bind(owner_id)
    .fetch_one(db)
    .await
}

/// Partial update. Absent fields keep their prior value via COALESCE; the
/// double id + owner predicate is what blocks cross-tenant writes.
pub async fn update(
    db: &PgPool,
    id: i64,
    owner_id: i64,
    patch: &UpdateProductRequest,
) -> Result<Option<ProductWithRefs>, sqlx::Error> {
    sqlx::query_as::<_, ProductWithRefs>(&format!(
        r#"
        WITH updated AS (
            UPDATE products SET
                title       = COALESCE($3, title),
                price       = COALESCE($4, price),
                description = COALESCE($5, description),
                keyword     = COALESCE($6, keyword),
                image       = COALESCE($7, image),
                category_id = COALESCE($8, category_id),
                brand_id    = COALESCE($9, brand_id)
            WHERE id = $1 AND user_id = $2
            RETURNING id, title, price, description, keyword, image,
                      category_id, brand_id, user_id, created_at
        )
        SELECT {JOINED_COLUMNS}
        FROM updated p
        JOIN categories c ON c.id = p.category_id
        JOIN brands b ON b.id = p.brand_id
        "#,
    ))
    .bind(id)
    .bind(owner_id)
    .bind(patch.title.as_deref())
    .bind(patch.price)
    .bind(patch.description.as_deref())
    .bind(patch.keyword.as_deref())
    .bind(patch.image.as_deref())
    .bind(patch.category_id)
    .bind(patch.brand_id)
    .fetch_optional(db)
    .await
}

/// Set the image path on a product, scoped by id and owner. Returns the
/// number of rows touched so the caller can distinguish a missing or foreign
/// product from success.
pub async fn set_image(
    db: &PgPool,
    id: i64,
    owner_id: i64,
    image: &str,
) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("UPDATE products SET image = $3 WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(owner_id)
        .bind(image)
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}

pub async fn delete(db: &PgPool, id: i64, owner_id: i64) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM products WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(owner_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}
