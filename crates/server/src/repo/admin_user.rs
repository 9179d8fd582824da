use shared_types::{AdminUser, AppError};
use sqlx::{Pool, Postgres};

use crate::error_convert::SqlxErrorExt;

/// Administrator row including the password hash. Never serialized.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminAccount {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
}

impl AdminAccount {
    pub fn to_user(&self) -> AdminUser {
        AdminUser {
            id: self.id,
            email: self.email.clone(),
        }
    }
}

pub async fn find_by_email(
    pool: &Pool<Postgres>,
    email: &str,
) -> Result<Option<AdminAccount>, AppError> {
    let row = sqlx::query_as::<_, AdminAccount>(
        "SELECT id, email, password_hash FROM admin_users WHERE email = LOWER($1)",
    )
    .bind(email.trim())
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

pub async fn find_by_id(pool: &Pool<Postgres>, id: i64) -> Result<Option<AdminUser>, AppError> {
    let row = sqlx::query_as::<_, AdminUser>("SELECT id, email FROM admin_users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// Create the admin or replace its password hash.
pub async fn upsert(
    pool: &Pool<Postgres>,
    email: &str,
    password_hash: &str,
) -> Result<AdminAccount, AppError> {
    let row = sqlx::query_as::<_, AdminAccount>(
        r#"
        INSERT INTO admin_users (email, password_hash)
        VALUES (LOWER($1), $2)
        ON CONFLICT (email)
        DO UPDATE SET password_hash = EXCLUDED.password_hash
        RETURNING id, email, password_hash
        "#,
    )
    .bind(email.trim())
    .bind(password_hash)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}
