use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::post::AuthorRef;

#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    pub id: i64,
    pub text: String,
    pub post_id: i64,
    pub author_id: i64,
    pub author_username: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: i64,
    pub text: String,
    pub post_id: i64,
    pub author: AuthorRef,
    pub created_at: DateTime<Utc>,
}

impl From<CommentRow> for CommentView {
    fn from(row: CommentRow) -> Self {
        Self {
            id: row.id,
            text: row.text,
            post_id: row.post_id,
            author: AuthorRef { id: row.author_id, username: row.author_username },
            created_at: row.created_at,
        }
    }
}
