use crate::error::ApiError;
use crate::middleware::CurrentUser;

/// Only the author of a post or comment may change it
pub fn ensure_author(author_id: i64, user: &CurrentUser, what: &str) -> Result<(), ApiError> {
    if author_id == user.id {
        Ok(())
    } else {
        tracing::warn!("User '{}' tried to modify {} owned by user {}", user.username, what, author_id);
        Err(ApiError::forbidden(format!("Only the author can change this {}", what)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::current_user;

    #[test]
    fn author_passes_others_are_forbidden() {
        assert!(ensure_author(3, &current_user(3, false), "post").is_ok());
        let err = ensure_author(3, &current_user(4, false), "comment").unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
        assert!(err.message().contains("comment"));
    }

    #[test]
    fn staff_is_not_an_author() {
        assert!(ensure_author(3, &current_user(9, true), "post").is_err());
    }
}
