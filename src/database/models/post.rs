use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::media::MediaStore;

/// A post joined with its author, category, location and comment count
#[derive(Debug, Clone, FromRow)]
pub struct PostRow {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub image: Option<String>,
    pub author_id: i64,
    pub author_username: String,
    pub category_id: Option<i64>,
    pub category_title: Option<String>,
    pub category_slug: Option<String>,
    pub category_is_published: Option<bool>,
    pub location_id: Option<i64>,
    pub location_name: Option<String>,
    pub location_is_published: Option<bool>,
    pub comment_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorRef {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryRef {
    pub id: i64,
    pub title: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationRef {
    pub id: i64,
    pub name: String,
}

/// Post document returned by the API
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub image: Option<String>,
    pub author: AuthorRef,
    pub category: Option<CategoryRef>,
    pub location: Option<LocationRef>,
    pub comment_count: i64,
}

impl PostRow {
    pub fn into_view(self, media: &MediaStore) -> PostView {
        let category = match (self.category_id, self.category_title, self.category_slug) {
            (Some(id), Some(title), Some(slug)) => Some(CategoryRef { id, title, slug }),
            _ => None,
        };
        let location = match (self.location_id, self.location_name) {
            (Some(id), Some(name)) => Some(LocationRef { id, name }),
            _ => None,
        };

        PostView {
            id: self.id,
            title: self.title,
            text: self.text,
            pub_date: self.pub_date,
            is_published: self.is_published,
            created_at: self.created_at,
            image: self.image.as_deref().map(|path| media.url_for(path)),
            author: AuthorRef { id: self.author_id, username: self.author_username },
            category,
            location,
            comment_count: self.comment_count,
        }
    }
}
