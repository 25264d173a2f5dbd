// handlers/protected/comments.rs - Commenting on posts

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;

use crate::app::AppState;
use crate::blog::ensure_author;
use crate::blog::forms::CommentForm;
use crate::database::models::{CommentRow, CommentView};
use crate::database::{comments, posts};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

/// A comment addressed through the wrong post is treated as missing
async fn load_comment(state: &AppState, post_id: i64, comment_id: i64) -> Result<CommentRow, ApiError> {
    comments::find(&state.pool, comment_id)
        .await?
        .filter(|comment| comment.post_id == post_id)
        .ok_or_else(|| ApiError::not_found(format!("Comment {} not found on post {}", comment_id, post_id)))
}

/// POST /api/posts/:id/comments
///
/// Expected Input:
/// ```json
/// { "text": "Great photos!" }
/// ```
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(post_id): Path<i64>,
    Json(form): Json<CommentForm>,
) -> ApiResult<CommentView> {
    posts::find(&state.pool, post_id)
        .await?
        .filter(|post| post.is_visible_to(Some(user.id), Utc::now()))
        .ok_or_else(|| ApiError::not_found(format!("Post {} not found", post_id)))?;

    let text = form.validate()?;
    let comment = comments::insert(&state.pool, post_id, user.id, &text).await?;

    tracing::info!("User '{}' commented on post {}", user.username, post_id);
    Ok(ApiResponse::created(CommentView::from(comment)))
}

/// PATCH /api/posts/:id/comments/:comment_id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((post_id, comment_id)): Path<(i64, i64)>,
    Json(form): Json<CommentForm>,
) -> ApiResult<CommentView> {
    let comment = load_comment(&state, post_id, comment_id).await?;
    ensure_author(comment.author_id, &user, "comment")?;

    let text = form.validate()?;
    let updated = comments::update_text(&state.pool, comment_id, &text).await?;
    Ok(ApiResponse::success(CommentView::from(updated)))
}

/// DELETE /api/posts/:id/comments/:comment_id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> ApiResult<()> {
    let comment = load_comment(&state, post_id, comment_id).await?;
    ensure_author(comment.author_id, &user, "comment")?;

    if !comments::delete(&state.pool, comment_id).await? {
        return Err(ApiError::not_found(format!("Comment {} not found", comment_id)));
    }

    tracing::info!("User '{}' deleted comment {}", user.username, comment_id);
    Ok(ApiResponse::no_content())
}
