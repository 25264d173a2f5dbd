//! Fixtures shared by unit tests

use chrono::{Duration, Utc};

use crate::database::models::PostRow;
use crate::middleware::CurrentUser;

/// A publicly visible post by user 1 in a published category and location
pub fn sample_post_row(id: i64) -> PostRow {
    let now = Utc::now();
    PostRow {
        id,
        title: format!("Post {}", id),
        text: "Text".to_string(),
        pub_date: now - Duration::hours(1),
        is_published: true,
        created_at: now - Duration::hours(2),
        image: None,
        author_id: 1,
        author_username: "author".to_string(),
        category_id: Some(1),
        category_title: Some("Travel".to_string()),
        category_slug: Some("travel".to_string()),
        category_is_published: Some(true),
        location_id: Some(1),
        location_name: Some("Moscow".to_string()),
        location_is_published: Some(true),
        comment_count: 0,
    }
}

pub fn current_user(id: i64, is_staff: bool) -> CurrentUser {
    CurrentUser {
        id,
        username: format!("user{}", id),
        is_staff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaStore;

    #[test]
    fn sample_post_renders_nested_references() {
        let media = MediaStore::new("/tmp/media", "/media", 1024);
        let view = PostRow { image: Some("posts_images/a.png".into()), ..sample_post_row(5) }.into_view(&media);
        assert_eq!(view.id, 5);
        assert_eq!(view.author.username, "author");
        assert_eq!(view.category.unwrap().slug, "travel");
        assert_eq!(view.location.unwrap().name, "Moscow");
        assert_eq!(view.image.as_deref(), Some("/media/posts_images/a.png"));
    }
}
