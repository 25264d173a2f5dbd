// handlers/public/auth.rs - Account registration and token acquisition

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::auth::{generate_jwt, hash_password_async, verify_password_async, Claims};
use crate::blog::forms::RegistrationForm;
use crate::config;
use crate::database::models::User;
use crate::database::users::{self, NewUser};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
    pub expires_in: u64,
}

/// POST /auth/registration - Create a new account
///
/// Expected Input:
/// ```json
/// {
///   "username": "leo",
///   "password1": "s3cret-pass",
///   "password2": "s3cret-pass",
///   "email": "leo@example.com"       // optional, as are first_name and last_name
/// }
/// ```
///
/// Responds 201 with the created user. Invalid input yields 400 with `field_errors`.
pub async fn registration(
    State(state): State<AppState>,
    Json(form): Json<RegistrationForm>,
) -> ApiResult<User> {
    form.validate(config::config().security.min_password_length)?;

    let username = form.username.trim();
    if users::username_taken(&state.pool, username, None).await? {
        return Err(ApiError::field_error("username", "A user with that username already exists."));
    }

    let password_hash = hash_password_async(form.password1.clone()).await?;
    let new_user = NewUser {
        username,
        email: form.email.trim(),
        first_name: form.first_name.trim(),
        last_name: form.last_name.trim(),
        password_hash: &password_hash,
        is_staff: false,
    };

    let user = users::insert(&state.pool, &new_user).await.map_err(|e| match e {
        // Lost a race with a concurrent registration of the same name
        crate::database::DatabaseError::Conflict(_) => {
            ApiError::field_error("username", "A user with that username already exists.")
        }
        other => other.into(),
    })?;

    tracing::info!("Registered user '{}' (ID: {})", user.username, user.id);
    Ok(ApiResponse::created(user))
}

/// POST /auth/login - Authenticate and receive a JWT
///
/// Expected Output:
/// ```json
/// {
///   "success": true,
///   "data": {
///     "token": "eyJhbGciOiJIUzI1NiI...",
///     "user": { "id": 1, "username": "leo", ... },
///     "expires_in": 86400
///   }
/// }
/// ```
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let user = users::find_by_username(&state.pool, payload.username.trim())
        .await?
        .ok_or_else(|| {
            tracing::info!("Login failed: unknown user '{}'", payload.username);
            ApiError::unauthorized("Invalid username or password")
        })?;

    if !verify_password_async(payload.password.clone(), user.password_hash.clone()).await? {
        tracing::info!("Login failed: wrong password for '{}'", user.username);
        return Err(ApiError::unauthorized("Invalid username or password"));
    }
    if !user.is_active {
        tracing::info!("Login refused: user '{}' is inactive", user.username);
        return Err(ApiError::unauthorized("Invalid username or password"));
    }

    let token = generate_jwt(&Claims::new(user.id, &user.username, user.is_staff))?;
    let expires_in = config::config().security.jwt_expiry_hours * 3600;

    tracing::info!("User '{}' logged in", user.username);
    Ok(ApiResponse::success(LoginResponse { token, user, expires_in }))
}
