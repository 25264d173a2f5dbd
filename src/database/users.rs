use sqlx::PgPool;

use super::manager::DatabaseError;
use super::models::User;

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, password_hash, is_staff, is_active, date_joined";

pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password_hash: &'a str,
    pub is_staff: bool,
}

#[derive(Debug, Default, Clone)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

pub async fn insert(pool: &PgPool, new_user: &NewUser<'_>) -> Result<User, DatabaseError> {
    let sql = format!(
        "INSERT INTO users (username, email, first_name, last_name, password_hash, is_staff)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {}",
        USER_COLUMNS
    );
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(new_user.username)
        .bind(new_user.email)
        .bind(new_user.first_name)
        .bind(new_user.last_name)
        .bind(new_user.password_hash)
        .bind(new_user.is_staff)
        .fetch_one(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, DatabaseError> {
    let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
    let user = sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(pool).await?;
    Ok(user)
}

pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, DatabaseError> {
    let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
    let user = sqlx::query_as::<_, User>(&sql).bind(username).fetch_optional(pool).await?;
    Ok(user)
}

/// True when another account already uses `username`
pub async fn username_taken(
    pool: &PgPool,
    username: &str,
    exclude_id: Option<i64>,
) -> Result<bool, DatabaseError> {
    let taken: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM users WHERE username = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
    )
    .bind(username)
    .bind(exclude_id)
    .fetch_one(pool)
    .await?;
    Ok(taken)
}

pub async fn update_profile(
    pool: &PgPool,
    id: i64,
    changes: &ProfileChanges,
) -> Result<User, DatabaseError> {
    let sql = format!(
        "UPDATE users SET
            username = COALESCE($2, username),
            email = COALESCE($3, email),
            first_name = COALESCE($4, first_name),
            last_name = COALESCE($5, last_name)
         WHERE id = $1
         RETURNING {}",
        USER_COLUMNS
    );
    sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .bind(changes.username.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.first_name.as_deref())
        .bind(changes.last_name.as_deref())
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("user {}", id)))
}

pub async fn set_staff(pool: &PgPool, username: &str, is_staff: bool) -> Result<User, DatabaseError> {
    let sql = format!(
        "UPDATE users SET is_staff = $2 WHERE username = $1 RETURNING {}",
        USER_COLUMNS
    );
    sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .bind(is_staff)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("user '{}'", username)))
}
