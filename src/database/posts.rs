use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::manager::DatabaseError;
use super::models::PostRow;

const POST_SELECT: &str = r#"
    SELECT
        p.id, p.title, p.text, p.pub_date, p.is_published, p.created_at, p.image,
        p.author_id, u.username AS author_username,
        p.category_id, c.title AS category_title, c.slug AS category_slug,
        c.is_published AS category_is_published,
        p.location_id, l.name AS location_name, l.is_published AS location_is_published,
        (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN locations l ON l.id = p.location_id
"#;

const POST_FROM: &str = r#"
    FROM posts p
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN locations l ON l.id = p.location_id
"#;

/// Which posts a listing covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostScope {
    /// Every publicly visible post
    Published,
    /// Publicly visible posts of one category
    Category(i64),
    /// Posts of one author; `include_hidden` drops the visibility rule
    Author { author_id: i64, include_hidden: bool },
}

#[derive(Debug)]
pub struct NewPost {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: i64,
    pub category_id: Option<i64>,
    pub location_id: Option<i64>,
    pub image: Option<String>,
    pub is_published: bool,
}

/// Partial update; `Some(None)` clears a nullable column
#[derive(Debug, Default, Clone)]
pub struct PostChanges {
    pub title: Option<String>,
    pub text: Option<String>,
    pub pub_date: Option<DateTime<Utc>>,
    pub category_id: Option<Option<i64>>,
    pub location_id: Option<Option<i64>>,
    pub image: Option<Option<String>>,
    pub is_published: Option<bool>,
}

impl PostChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.text.is_none()
            && self.pub_date.is_none()
            && self.category_id.is_none()
            && self.location_id.is_none()
            && self.image.is_none()
            && self.is_published.is_none()
    }
}

/// SQL form of the public visibility rule. Must agree with `PostRow::is_publicly_visible`.
fn push_visible(qb: &mut QueryBuilder<'_, Postgres>, now: DateTime<Utc>) {
    qb.push("(p.is_published AND p.pub_date <= ")
        .push_bind(now)
        .push(" AND c.is_published IS TRUE AND (p.location_id IS NULL OR l.is_published))");
}

fn push_scope(qb: &mut QueryBuilder<'_, Postgres>, scope: PostScope, now: DateTime<Utc>) {
    match scope {
        PostScope::Published => push_visible(qb, now),
        PostScope::Category(category_id) => {
            push_visible(qb, now);
            qb.push(" AND p.category_id = ").push_bind(category_id);
        }
        PostScope::Author { author_id, include_hidden } => {
            qb.push("p.author_id = ").push_bind(author_id);
            if !include_hidden {
                qb.push(" AND ");
                push_visible(qb, now);
            }
        }
    }
}

fn list_query(scope: PostScope, now: DateTime<Utc>, limit: i64, offset: i64) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(POST_SELECT);
    qb.push(" WHERE ");
    push_scope(&mut qb, scope, now);
    qb.push(" ORDER BY p.pub_date DESC, p.id DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);
    qb
}

fn count_query(scope: PostScope, now: DateTime<Utc>) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*)");
    qb.push(POST_FROM).push(" WHERE ");
    push_scope(&mut qb, scope, now);
    qb
}

pub async fn list(
    pool: &PgPool,
    scope: PostScope,
    now: DateTime<Utc>,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostRow>, DatabaseError> {
    let mut qb = list_query(scope, now, limit, offset);
    let rows = qb.build_query_as::<PostRow>().fetch_all(pool).await?;
    Ok(rows)
}

pub async fn count(pool: &PgPool, scope: PostScope, now: DateTime<Utc>) -> Result<i64, DatabaseError> {
    let mut qb = count_query(scope, now);
    let total = qb.build_query_scalar::<i64>().fetch_one(pool).await?;
    Ok(total)
}

/// Fetch a post regardless of visibility; callers decide who may see it
pub async fn find(pool: &PgPool, id: i64) -> Result<Option<PostRow>, DatabaseError> {
    let sql = format!("{} WHERE p.id = $1", POST_SELECT);
    let row = sqlx::query_as::<_, PostRow>(&sql).bind(id).fetch_optional(pool).await?;
    Ok(row)
}

pub async fn insert(pool: &PgPool, new_post: NewPost) -> Result<i64, DatabaseError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO posts (title, text, pub_date, author_id, category_id, location_id, image, is_published)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING id",
    )
    .bind(new_post.title)
    .bind(new_post.text)
    .bind(new_post.pub_date)
    .bind(new_post.author_id)
    .bind(new_post.category_id)
    .bind(new_post.location_id)
    .bind(new_post.image)
    .bind(new_post.is_published)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Returns false when the post does not exist
pub async fn update(pool: &PgPool, id: i64, changes: PostChanges) -> Result<bool, DatabaseError> {
    if changes.is_empty() {
        let found: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM posts WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;
        return Ok(found);
    }

    let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new("UPDATE posts SET ");
    {
        let mut set = qb.separated(", ");
        if let Some(title) = changes.title {
            set.push("title = ").push_bind_unseparated(title);
        }
        if let Some(text) = changes.text {
            set.push("text = ").push_bind_unseparated(text);
        }
        if let Some(pub_date) = changes.pub_date {
            set.push("pub_date = ").push_bind_unseparated(pub_date);
        }
        if let Some(category_id) = changes.category_id {
            set.push("category_id = ").push_bind_unseparated(category_id);
        }
        if let Some(location_id) = changes.location_id {
            set.push("location_id = ").push_bind_unseparated(location_id);
        }
        if let Some(image) = changes.image {
            set.push("image = ").push_bind_unseparated(image);
        }
        if let Some(is_published) = changes.is_published {
            set.push("is_published = ").push_bind_unseparated(is_published);
        }
    }
    qb.push(" WHERE id = ").push_bind(id);

    let result = qb.build().execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

/// Delete a post, returning its stored image path. `None` when nothing was deleted.
pub async fn delete(pool: &PgPool, id: i64) -> Result<Option<Option<String>>, DatabaseError> {
    let image = sqlx::query_scalar::<_, Option<String>>("DELETE FROM posts WHERE id = $1 RETURNING image")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn published_scope_applies_every_visibility_rule() {
        let qb = list_query(PostScope::Published, Utc::now(), 10, 0);
        let sql = qb.sql();
        assert!(sql.contains("p.is_published AND p.pub_date <= $1"));
        assert!(sql.contains("c.is_published IS TRUE"));
        assert!(sql.contains("p.location_id IS NULL OR l.is_published"));
        assert!(sql.contains("ORDER BY p.pub_date DESC"));
        assert!(sql.contains("LIMIT $2 OFFSET $3"));
    }

    #[test]
    fn category_scope_filters_by_category() {
        let qb = count_query(PostScope::Category(7), Utc::now());
        let sql = qb.sql();
        assert!(sql.starts_with("SELECT COUNT(*)"));
        assert!(sql.contains("p.is_published AND p.pub_date <= $1"));
        assert!(sql.contains("AND p.category_id = $2"));
    }

    #[test]
    fn author_scope_can_include_hidden_posts() {
        let own = list_query(PostScope::Author { author_id: 1, include_hidden: true }, Utc::now(), 10, 0);
        assert!(own.sql().contains("p.author_id = $1 ORDER BY"));
        assert!(!own.sql().contains("p.is_published AND"));

        let public = list_query(PostScope::Author { author_id: 1, include_hidden: false }, Utc::now(), 10, 0);
        assert!(public.sql().contains("p.author_id = $1 AND (p.is_published AND p.pub_date <= $2"));
    }

    #[test]
    fn empty_changes_are_detected() {
        assert!(PostChanges::default().is_empty());
        let changes = PostChanges { location_id: Some(None), ..Default::default() };
        assert!(!changes.is_empty());
    }
}
