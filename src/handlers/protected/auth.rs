// handlers/protected/auth.rs - GET /api/auth/whoami

use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::database::{models::User, users};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};

/// Current user's full account record, read fresh from the database
pub async fn whoami(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<User> {
    let account = users::find_by_id(&state.pool, user.id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User account no longer exists"))?;
    Ok(ApiResponse::success(account))
}
