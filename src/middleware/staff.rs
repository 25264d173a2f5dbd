use axum::{extract::Request, middleware::Next, response::Response};

use super::validate_user::CurrentUser;
use crate::error::ApiError;

/// Admin routes require a staff account; runs after `validate_user_middleware`
pub async fn require_staff_middleware(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !user.is_staff {
        tracing::warn!("Non-staff user '{}' denied admin access", user.username);
        return Err(ApiError::forbidden("Staff access required"));
    }

    Ok(next.run(request).await)
}
