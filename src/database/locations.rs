use sqlx::PgPool;

use super::manager::DatabaseError;
use super::models::Location;

const LOCATION_COLUMNS: &str = "id, name, is_published, created_at";

pub async fn insert(pool: &PgPool, name: &str, is_published: bool) -> Result<Location, DatabaseError> {
    let sql = format!(
        "INSERT INTO locations (name, is_published) VALUES ($1, $2) RETURNING {}",
        LOCATION_COLUMNS
    );
    let location = sqlx::query_as::<_, Location>(&sql)
        .bind(name)
        .bind(is_published)
        .fetch_one(pool)
        .await?;
    Ok(location)
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    name: Option<&str>,
    is_published: Option<bool>,
) -> Result<Location, DatabaseError> {
    let sql = format!(
        "UPDATE locations SET
            name = COALESCE($2, name),
            is_published = COALESCE($3, is_published)
         WHERE id = $1
         RETURNING {}",
        LOCATION_COLUMNS
    );
    sqlx::query_as::<_, Location>(&sql)
        .bind(id)
        .bind(name)
        .bind(is_published)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("location {}", id)))
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM locations WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn exists(pool: &PgPool, id: i64) -> Result<bool, DatabaseError> {
    let found: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM locations WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(found)
}
