// handlers/protected/profile.rs - Own profile read and update

use axum::{extract::State, Extension, Json};

use crate::app::AppState;
use crate::blog::forms::ProfileForm;
use crate::database::{models::User, users, DatabaseError};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

const USERNAME_TAKEN: &str = "A user with that username already exists.";

/// GET /api/profile
pub async fn show(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<User> {
    let account = users::find_by_id(&state.pool, user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;
    Ok(ApiResponse::success(account))
}

/// PATCH /api/profile - Update username, email, first and last name
///
/// Expected Input (all fields optional):
/// ```json
/// { "username": "leo", "email": "leo@example.com", "first_name": "Leo", "last_name": "Tolstoy" }
/// ```
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(form): Json<ProfileForm>,
) -> ApiResult<User> {
    let changes = form.validate()?;

    if let Some(username) = &changes.username {
        if users::username_taken(&state.pool, username, Some(user.id)).await? {
            return Err(ApiError::field_error("username", USERNAME_TAKEN));
        }
    }

    let account = users::update_profile(&state.pool, user.id, &changes)
        .await
        .map_err(|e| match e {
            DatabaseError::Conflict(_) => ApiError::field_error("username", USERNAME_TAKEN),
            other => other.into(),
        })?;

    tracing::info!("User {} updated profile", account.id);
    Ok(ApiResponse::success(account))
}
