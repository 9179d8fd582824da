use chrono::{DateTime, Utc};
use shared_types::AppError;
use sqlx::{Pool, Postgres};

use crate::error_convert::SqlxErrorExt;

/// Persist the SHA-256 hash of a newly issued refresh token.
pub async fn insert(
    pool: &Pool<Postgres>,
    admin_id: i64,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> Result<(), AppError> {
    sqlx::query("INSERT INTO refresh_tokens (admin_id, token_hash, expires_at) VALUES ($1, $2, $3)")
        .bind(admin_id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

    Ok(())
}

/// Revoke a live token in one statement. Returns `true` only if the token
/// existed, belonged to the admin, was unexpired, and had not been used.
pub async fn consume(pool: &Pool<Postgres>, admin_id: i64, token_hash: &str) -> Result<bool, AppError> {
    let consumed = sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE refresh_tokens
        SET revoked = TRUE
        WHERE token_hash = $1 AND admin_id = $2 AND revoked = FALSE AND expires_at > NOW()
        RETURNING id
        "#,
    )
    .bind(token_hash)
    .bind(admin_id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(consumed.is_some())
}

pub async fn revoke_all(pool: &Pool<Postgres>, admin_id: i64) -> Result<(), AppError> {
    sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE admin_id = $1 AND revoked = FALSE")
        .bind(admin_id)
        .execute(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

    Ok(())
}
