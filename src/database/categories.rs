use sqlx::PgPool;

use super::manager::DatabaseError;
use super::models::Category;

const CATEGORY_COLUMNS: &str = "id, title, description, slug, is_published, created_at";

pub struct NewCategory<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub slug: &'a str,
    pub is_published: bool,
}

#[derive(Debug, Default, Clone)]
pub struct CategoryChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub is_published: Option<bool>,
}

pub async fn insert(pool: &PgPool, new_category: &NewCategory<'_>) -> Result<Category, DatabaseError> {
    let sql = format!(
        "INSERT INTO categories (title, description, slug, is_published)
         VALUES ($1, $2, $3, $4)
         RETURNING {}",
        CATEGORY_COLUMNS
    );
    let category = sqlx::query_as::<_, Category>(&sql)
        .bind(new_category.title)
        .bind(new_category.description)
        .bind(new_category.slug)
        .bind(new_category.is_published)
        .fetch_one(pool)
        .await?;
    Ok(category)
}

pub async fn update(pool: &PgPool, id: i64, changes: &CategoryChanges) -> Result<Category, DatabaseError> {
    let sql = format!(
        "UPDATE categories SET
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            slug = COALESCE($4, slug),
            is_published = COALESCE($5, is_published)
         WHERE id = $1
         RETURNING {}",
        CATEGORY_COLUMNS
    );
    sqlx::query_as::<_, Category>(&sql)
        .bind(id)
        .bind(changes.title.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.slug.as_deref())
        .bind(changes.is_published)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("category {}", id)))
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn exists(pool: &PgPool, id: i64) -> Result<bool, DatabaseError> {
    let found: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM categories WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(found)
}

pub async fn slug_taken(pool: &PgPool, slug: &str, exclude_id: Option<i64>) -> Result<bool, DatabaseError> {
    let taken: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM categories WHERE slug = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
    )
    .bind(slug)
    .bind(exclude_id)
    .fetch_one(pool)
    .await?;
    Ok(taken)
}

/// Category page lookup: unpublished categories behave as missing
pub async fn find_published_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Category>, DatabaseError> {
    let sql = format!(
        "SELECT {} FROM categories WHERE slug = $1 AND is_published",
        CATEGORY_COLUMNS
    );
    let category = sqlx::query_as::<_, Category>(&sql).bind(slug).fetch_optional(pool).await?;
    Ok(category)
}
