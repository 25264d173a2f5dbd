use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::auth::AuthUser;
use crate::app::AppState;
use crate::database::users;
use crate::error::ApiError;

/// User behind the token, re-read from the database on every request
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub is_staff: bool,
}

/// Middleware that validates the user from JWT claims against the users table.
/// Ensures the account still exists and is active.
pub async fn validate_user_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before user validation"))?;

    let user = users::find_by_id(&state.pool, auth_user.id).await?.ok_or_else(|| {
        tracing::warn!(
            "User validation failed: user '{}' (ID: {}) no longer exists",
            auth_user.username,
            auth_user.id
        );
        ApiError::unauthorized("User account no longer exists")
    })?;

    if !user.is_active {
        tracing::warn!("User validation failed: user '{}' is inactive", user.username);
        return Err(ApiError::forbidden(format!("User '{}' is not active", user.username)));
    }

    let current_user = CurrentUser {
        id: user.id,
        username: user.username,
        is_staff: user.is_staff,
    };

    tracing::debug!(
        "User validation successful: {} (staff: {})",
        current_user.username,
        current_user.is_staff
    );

    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}
