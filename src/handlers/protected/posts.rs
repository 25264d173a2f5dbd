// handlers/protected/posts.rs - Authoring posts

use axum::{
    extract::{Path, State},
    Extension,
};
use chrono::Utc;

use crate::app::AppState;
use crate::blog::ensure_author;
use crate::database::models::{PostRow, PostView};
use crate::database::posts;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

use super::submission::PostSubmission;

async fn load_post(state: &AppState, id: i64) -> Result<PostRow, ApiError> {
    posts::find(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Post {} not found", id)))
}

/// POST /api/posts - Publish a post as the current user
///
/// Accepts `application/json` or `multipart/form-data` with an optional `image` file part.
///
/// Expected Input:
/// ```json
/// {
///   "title": "Weekend in Kazan",
///   "text": "...",
///   "pub_date": "2024-05-01T10:00:00Z",   // optional, defaults to now
///   "category_id": 1,                     // optional
///   "location_id": 2,                     // optional
///   "is_published": true                  // optional; true for JSON, false when a form omits it
/// }
/// ```
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    submission: PostSubmission,
) -> ApiResult<PostView> {
    let mut new_post = submission.create_form().into_new_post(user.id, None, Utc::now())?;
    submission.form.check_references(&state.pool).await?;

    if let Some(upload) = &submission.image {
        new_post.image = Some(state.media.save_post_image(&upload.file_name, &upload.bytes).await?);
    }
    let image = new_post.image.clone();

    let id = match posts::insert(&state.pool, new_post).await {
        Ok(id) => id,
        Err(e) => {
            if let Some(path) = &image {
                state.media.remove(path).await;
            }
            return Err(e.into());
        }
    };

    tracing::info!("User '{}' created post {}", user.username, id);
    let post = load_post(&state, id).await?;
    Ok(ApiResponse::created(post.into_view(&state.media)))
}

/// PATCH /api/posts/:id - Partial update by the author.
/// 404 when the post does not exist, 403 for anyone but the author.
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    submission: PostSubmission,
) -> ApiResult<PostView> {
    let post = load_post(&state, id).await?;
    ensure_author(post.author_id, &user, "post")?;

    let mut changes = submission.form.clone().into_changes()?;
    submission.form.check_references(&state.pool).await?;

    let mut stale_image = None;
    let mut saved_image = None;
    if let Some(upload) = &submission.image {
        let path = state.media.save_post_image(&upload.file_name, &upload.bytes).await?;
        changes.image = Some(Some(path.clone()));
        saved_image = Some(path);
        stale_image = post.image.clone();
    } else if submission.clear_image {
        changes.image = Some(None);
        stale_image = post.image.clone();
    }

    let updated = match posts::update(&state.pool, id, changes).await {
        Ok(updated) => updated,
        Err(e) => {
            if let Some(path) = &saved_image {
                state.media.remove(path).await;
            }
            return Err(e.into());
        }
    };
    if !updated {
        if let Some(path) = &saved_image {
            state.media.remove(path).await;
        }
        return Err(ApiError::not_found(format!("Post {} not found", id)));
    }
    if let Some(path) = stale_image {
        state.media.remove(&path).await;
    }

    tracing::info!("User '{}' updated post {}", user.username, id);
    let post = load_post(&state, id).await?;
    Ok(ApiResponse::success(post.into_view(&state.media)))
}

/// DELETE /api/posts/:id - Removes the post, its comments and its image
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    let post = load_post(&state, id).await?;
    ensure_author(post.author_id, &user, "post")?;

    let image = posts::delete(&state.pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Post {} not found", id)))?;
    if let Some(path) = image {
        state.media.remove(&path).await;
    }

    tracing::info!("User '{}' deleted post {}", user.username, id);
    Ok(ApiResponse::no_content())
}
