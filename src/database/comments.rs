use sqlx::PgPool;

use super::manager::DatabaseError;
use super::models::CommentRow;

const COMMENT_SELECT: &str = r#"
    SELECT c.id, c.text, c.post_id, c.author_id, u.username AS author_username, c.created_at
    FROM comments c
    JOIN users u ON u.id = c.author_id
"#;

/// Comments of a post, oldest first
pub async fn list_for_post(pool: &PgPool, post_id: i64) -> Result<Vec<CommentRow>, DatabaseError> {
    let sql = format!("{} WHERE c.post_id = $1 ORDER BY c.created_at ASC, c.id ASC", COMMENT_SELECT);
    let rows = sqlx::query_as::<_, CommentRow>(&sql).bind(post_id).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<CommentRow>, DatabaseError> {
    let sql = format!("{} WHERE c.id = $1", COMMENT_SELECT);
    let row = sqlx::query_as::<_, CommentRow>(&sql).bind(id).fetch_optional(pool).await?;
    Ok(row)
}

pub async fn insert(pool: &PgPool, post_id: i64, author_id: i64, text: &str) -> Result<CommentRow, DatabaseError> {
    let row = sqlx::query_as::<_, CommentRow>(
        r#"
        WITH c AS (
            INSERT INTO comments (text, post_id, author_id) VALUES ($1, $2, $3)
            RETURNING id, text, post_id, author_id, created_at
        )
        SELECT c.id, c.text, c.post_id, c.author_id, u.username AS author_username, c.created_at
        FROM c JOIN users u ON u.id = c.author_id
        "#,
    )
    .bind(text)
    .bind(post_id)
    .bind(author_id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn update_text(pool: &PgPool, id: i64, text: &str) -> Result<CommentRow, DatabaseError> {
    sqlx::query_as::<_, CommentRow>(
        r#"
        WITH c AS (
            UPDATE comments SET text = $2 WHERE id = $1
            RETURNING id, text, post_id, author_id, created_at
        )
        SELECT c.id, c.text, c.post_id, c.author_id, u.username AS author_username, c.created_at
        FROM c JOIN users u ON u.id = c.author_id
        "#,
    )
    .bind(id)
    .bind(text)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound(format!("comment {}", id)))
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
