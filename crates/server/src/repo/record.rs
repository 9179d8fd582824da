use chrono::{DateTime, Utc};
use shared_types::{AppError, Record, RecordBody, Role, Status};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

/// Raw row shape shared by the three per-role tables.
#[derive(sqlx::FromRow)]
struct RecordRow {
    id: Uuid,
    status: String,
    payload: serde_json::Value,
    created_at: Option<DateTime<Utc>>,
}

impl RecordRow {
    fn into_record(self, role: Role) -> Result<Record, AppError> {
        let status: Status = self
            .status
            .parse()
            .map_err(|e: String| AppError::internal(format!("Record {}: {e}", self.id)))?;
        let body: RecordBody = serde_json::from_value(self.payload).map_err(|e| {
            AppError::internal(format!("Record {} has an unreadable payload: {e}", self.id))
        })?;
        if body.role() != role {
            return Err(AppError::internal(format!(
                "Record {} is stored as {} but shaped as {}",
                self.id,
                role,
                body.role()
            )));
        }
        Ok(Record {
            id: self.id,
            status,
            created_at: self.created_at,
            body,
        })
    }
}

const COLUMNS: &str = "id, status, payload, created_at";

/// Insert a new record with status awaiting and the database clock as creation time.
pub async fn create(pool: &Pool<Postgres>, body: RecordBody) -> Result<Record, AppError> {
    let role = body.role();
    let payload = serde_json::to_value(&body)
        .map_err(|e| AppError::internal(format!("Failed to encode record: {e}")))?;

    let row = sqlx::query_as::<_, RecordRow>(&format!(
        "INSERT INTO {table} (id, status, payload) VALUES ($1, $2, $3) RETURNING {COLUMNS}",
        table = role.collection(),
    ))
    .bind(Uuid::new_v4())
    .bind(Status::Awaiting.as_str())
    .bind(payload)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    row.into_record(role)
}

/// Most recent records first, capped at `limit`.
pub async fn list_recent(
    pool: &Pool<Postgres>,
    role: Role,
    limit: i64,
) -> Result<Vec<Record>, AppError> {
    let rows = sqlx::query_as::<_, RecordRow>(&format!(
        "SELECT {COLUMNS} FROM {table} ORDER BY created_at DESC NULLS LAST LIMIT $1",
        table = role.collection(),
    ))
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    rows.into_iter().map(|r| r.into_record(role)).collect()
}

pub async fn find_by_id(
    pool: &Pool<Postgres>,
    role: Role,
    id: Uuid,
) -> Result<Option<Record>, AppError> {
    let row = sqlx::query_as::<_, RecordRow>(&format!(
        "SELECT {COLUMNS} FROM {table} WHERE id = $1",
        table = role.collection(),
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    row.map(|r| r.into_record(role)).transpose()
}

/// Status is the only mutable column.
pub async fn update_status(
    pool: &Pool<Postgres>,
    role: Role,
    id: Uuid,
    status: Status,
) -> Result<Option<Record>, AppError> {
    let row = sqlx::query_as::<_, RecordRow>(&format!(
        "UPDATE {table} SET status = $2 WHERE id = $1 RETURNING {COLUMNS}",
        table = role.collection(),
    ))
    .bind(id)
    .bind(status.as_str())
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    row.map(|r| r.into_record(role)).transpose()
}

/// Returns `false` when no record had that id.
pub async fn delete(pool: &Pool<Postgres>, role: Role, id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query(&format!(
        "DELETE FROM {table} WHERE id = $1",
        table = role.collection(),
    ))
    .bind(id)
    .execute(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(result.rows_affected() > 0)
}
