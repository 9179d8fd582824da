use shared_types::{AppError, ConfigKey};
use sqlx::{Pool, Postgres};

use crate::error_convert::SqlxErrorExt;

/// Fetch a singleton config document.
pub async fn get(
    pool: &Pool<Postgres>,
    key: ConfigKey,
) -> Result<Option<serde_json::Value>, AppError> {
    let value = sqlx::query_scalar::<_, serde_json::Value>(
        "SELECT value FROM app_config WHERE key = $1",
    )
    .bind(key.as_str())
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(value)
}

/// Replace a singleton config document.
pub async fn put(
    pool: &Pool<Postgres>,
    key: ConfigKey,
    value: serde_json::Value,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO app_config (key, value)
        VALUES ($1, $2)
        ON CONFLICT (key)
        DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
        "#,
    )
    .bind(key.as_str())
    .bind(value)
    .execute(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(())
}
