use chrono::{DateTime, Utc};

use crate::database::models::PostRow;

impl PostRow {
    /// Published, not scheduled for the future, in a published category, and
    /// not pinned to an unpublished location. Same rule as `PostScope::Published`.
    pub fn is_publicly_visible(&self, now: DateTime<Utc>) -> bool {
        self.is_published
            && self.pub_date <= now
            && self.category_is_published == Some(true)
            && self.location_is_published != Some(false)
    }

    /// Authors always see their own posts, drafts included
    pub fn is_visible_to(&self, viewer_id: Option<i64>, now: DateTime<Utc>) -> bool {
        viewer_id == Some(self.author_id) || self.is_publicly_visible(now)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::testing::sample_post_row;

    #[test]
    fn published_post_is_visible() {
        let now = Utc::now();
        assert!(sample_post_row(1).is_publicly_visible(now));
    }

    #[test]
    fn unpublished_post_is_hidden() {
        let now = Utc::now();
        let post = PostRow { is_published: false, ..sample_post_row(1) };
        assert!(!post.is_publicly_visible(now));
    }

    #[test]
    fn future_post_is_hidden_until_pub_date() {
        let now = Utc::now();
        let post = PostRow { pub_date: now + Duration::hours(1), ..sample_post_row(1) };
        assert!(!post.is_publicly_visible(now));
        assert!(post.is_publicly_visible(now + Duration::hours(2)));

        let exactly_now = PostRow { pub_date: now, ..sample_post_row(1) };
        assert!(exactly_now.is_publicly_visible(now));
    }

    #[test]
    fn category_must_be_present_and_published() {
        let now = Utc::now();
        let hidden_category = PostRow { category_is_published: Some(false), ..sample_post_row(1) };
        assert!(!hidden_category.is_publicly_visible(now));

        let no_category = PostRow {
            category_id: None,
            category_title: None,
            category_slug: None,
            category_is_published: None,
            ..sample_post_row(1)
        };
        assert!(!no_category.is_publicly_visible(now));
    }

    #[test]
    fn location_rule_only_applies_when_set() {
        let now = Utc::now();
        let hidden_location = PostRow { location_is_published: Some(false), ..sample_post_row(1) };
        assert!(!hidden_location.is_publicly_visible(now));

        let no_location = PostRow {
            location_id: None,
            location_name: None,
            location_is_published: None,
            ..sample_post_row(1)
        };
        assert!(no_location.is_publicly_visible(now));
    }

    #[test]
    fn author_sees_own_hidden_post() {
        let now = Utc::now();
        let draft = PostRow { is_published: false, author_id: 7, ..sample_post_row(1) };
        assert!(draft.is_visible_to(Some(7), now));
        assert!(!draft.is_visible_to(Some(8), now));
        assert!(!draft.is_visible_to(None, now));
    }
}
