use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::errors::ApiError;

/// Stored admin account. Deliberately not serializable: the password hash
/// and reset token must never reach a response body.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminDoc {
    pub id: Uuid,
    pub username: String,
    pub password: String,
    pub is_admin: bool,
    pub forgot_password: Option<String>,
}

pub async fn create_admin(
    pool: &Pool<Postgres>,
    username: &str,
    password_hash: &str,
) -> Result<AdminDoc, ApiError> {
    sqlx::query_as::<_, AdminDoc>(
        r#"
            INSERT INTO admins (id, username, password, is_admin)
            VALUES ($1, $2, $3, FALSE)
            RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(password_hash)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "admin insert failed");
        ApiError::Database("Could not save to db. Please try again later.".to_string())
    })
}

pub async fn find_by_username(
    pool: &Pool<Postgres>,
    username: &str,
) -> Result<Option<AdminDoc>, ApiError> {
    sqlx::query_as::<_, AdminDoc>("SELECT * FROM admins WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "admin fetch failed");
            ApiError::Database("Error while fetching the admin.".to_string())
        })
}

pub async fn set_password(
    pool: &Pool<Postgres>,
    id: Uuid,
    password_hash: &str,
) -> Result<Option<AdminDoc>, ApiError> {
    sqlx::query_as::<_, AdminDoc>(
        "UPDATE admins SET password = $2 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(password_hash)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "admin password update failed");
        ApiError::Database("Could not save to db. Please try again later.".to_string())
    })
}

pub async fn set_forgot_token(
    pool: &Pool<Postgres>,
    username: &str,
    token: &str,
) -> Result<Option<AdminDoc>, ApiError> {
    sqlx::query_as::<_, AdminDoc>(
        "UPDATE admins SET forgot_password = $2 WHERE username = $1 RETURNING *",
    )
    .bind(username)
    .bind(token)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "forgot token update failed");
        ApiError::Database("Could not save to db. Please try again later.".to_string())
    })
}

/// Swaps the password for whoever holds the reset token and clears the
/// token in the same statement, so a handle can only be used once.
pub async fn consume_forgot_token(
    pool: &Pool<Postgres>,
    token: &str,
    password_hash: &str,
) -> Result<Option<AdminDoc>, ApiError> {
    sqlx::query_as::<_, AdminDoc>(
        r#"
            UPDATE admins
            SET password = $2, forgot_password = NULL
            WHERE forgot_password = $1
            RETURNING *
        "#,
    )
    .bind(token)
    .bind(password_hash)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "forgot token consume failed");
        ApiError::Database("Could not save to db. Please try again later.".to_string())
    })
}
