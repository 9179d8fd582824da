pub mod memory;

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use shared_types::{
    AdminUser, AppError, ConfigKey, NotificationConfig, Record, RecordBody, Role, Status,
    TeacherAuthConfig,
};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::repo;
use crate::repo::admin_user::AdminAccount;
pub use memory::MemoryStore;

/// Handle to the record store, constructed once at startup and handed to
/// handlers through `AppState`.
///
/// `Postgres` is the durable backend. `Memory` keeps everything in-process and
/// backs both the test suite and demo mode.
#[derive(Clone)]
pub enum RecordStore {
    Postgres(Pool<Postgres>),
    Memory(Arc<MemoryStore>),
}

impl RecordStore {
    /// Empty in-memory store that accepts writes.
    pub fn in_memory() -> Self {
        RecordStore::Memory(Arc::new(MemoryStore::new()))
    }

    /// Read-only demo store seeded with sample records.
    pub fn demo() -> Self {
        RecordStore::Memory(Arc::new(MemoryStore::demo(crate::demo::sample_records())))
    }

    pub fn is_demo(&self) -> bool {
        matches!(self, RecordStore::Memory(m) if m.is_demo())
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            RecordStore::Postgres(_) => "postgres",
            RecordStore::Memory(m) if m.is_demo() => "demo",
            RecordStore::Memory(_) => "memory",
        }
    }

    /// Round-trip to the backend.
    pub async fn ping(&self) -> Result<(), AppError> {
        match self {
            RecordStore::Postgres(pool) => {
                sqlx::query_scalar::<_, i32>("SELECT 1")
                    .fetch_one(pool)
                    .await
                    .map_err(|e| AppError::database(e.to_string()))?;
                Ok(())
            }
            RecordStore::Memory(_) => Ok(()),
        }
    }

    // ── Records ─────────────────────────────────────────────────────

    pub async fn create(&self, body: RecordBody) -> Result<Record, AppError> {
        match self {
            RecordStore::Postgres(pool) => repo::record::create(pool, body).await,
            RecordStore::Memory(m) => Ok(m.create(body).await),
        }
    }

    pub async fn list_recent(&self, role: Role, limit: usize) -> Result<Vec<Record>, AppError> {
        match self {
            RecordStore::Postgres(pool) => {
                let limit = i64::try_from(limit).unwrap_or(i64::MAX);
                repo::record::list_recent(pool, role, limit).await
            }
            RecordStore::Memory(m) => Ok(m.list_recent(role, limit).await),
        }
    }

    pub async fn find(&self, role: Role, id: Uuid) -> Result<Option<Record>, AppError> {
        match self {
            RecordStore::Postgres(pool) => repo::record::find_by_id(pool, role, id).await,
            RecordStore::Memory(m) => Ok(m.find(role, id).await),
        }
    }

    pub async fn update_status(
        &self,
        role: Role,
        id: Uuid,
        status: Status,
    ) -> Result<Option<Record>, AppError> {
        match self {
            RecordStore::Postgres(pool) => repo::record::update_status(pool, role, id, status).await,
            RecordStore::Memory(m) => Ok(m.update_status(role, id, status).await),
        }
    }

    pub async fn delete(&self, role: Role, id: Uuid) -> Result<bool, AppError> {
        match self {
            RecordStore::Postgres(pool) => repo::record::delete(pool, role, id).await,
            RecordStore::Memory(m) => Ok(m.delete(role, id).await),
        }
    }

    // ── Singleton config ────────────────────────────────────────────

    pub async fn config<T: DeserializeOwned>(&self, key: ConfigKey) -> Result<Option<T>, AppError> {
        let value = match self {
            RecordStore::Postgres(pool) => repo::app_config::get(pool, key).await?,
            RecordStore::Memory(m) => m.config(key).await,
        };
        value
            .map(|v| {
                serde_json::from_value(v).map_err(|e| {
                    AppError::internal(format!("Config '{}' is malformed: {e}", key.as_str()))
                })
            })
            .transpose()
    }

    pub async fn put_config<T: Serialize>(&self, key: ConfigKey, value: &T) -> Result<(), AppError> {
        let value = serde_json::to_value(value)
            .map_err(|e| AppError::internal(format!("Failed to encode config: {e}")))?;
        match self {
            RecordStore::Postgres(pool) => repo::app_config::put(pool, key, value).await,
            RecordStore::Memory(m) => {
                m.put_config(key, value).await;
                Ok(())
            }
        }
    }

    /// Webhook settings; an absent document means notifications are off.
    pub async fn notification_config(&self) -> Result<NotificationConfig, AppError> {
        Ok(self
            .config(ConfigKey::Notifications)
            .await?
            .unwrap_or_default())
    }

    /// Teacher gate settings; an absent document means the default code.
    pub async fn teacher_auth_config(&self) -> Result<TeacherAuthConfig, AppError> {
        Ok(self.config(ConfigKey::TeacherAuth).await?.unwrap_or_default())
    }

    // ── Administrators ──────────────────────────────────────────────

    pub async fn find_admin_by_email(&self, email: &str) -> Result<Option<AdminAccount>, AppError> {
        match self {
            RecordStore::Postgres(pool) => repo::admin_user::find_by_email(pool, email).await,
            RecordStore::Memory(m) => Ok(m.find_admin_by_email(email).await),
        }
    }

    pub async fn find_admin(&self, id: i64) -> Result<Option<AdminUser>, AppError> {
        match self {
            RecordStore::Postgres(pool) => repo::admin_user::find_by_id(pool, id).await,
            RecordStore::Memory(m) => Ok(m.find_admin(id).await),
        }
    }

    pub async fn upsert_admin(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<AdminAccount, AppError> {
        match self {
            RecordStore::Postgres(pool) => {
                repo::admin_user::upsert(pool, email, password_hash).await
            }
            RecordStore::Memory(m) => Ok(m.upsert_admin(email, password_hash).await),
        }
    }

    // ── Refresh tokens ──────────────────────────────────────────────

    pub async fn store_refresh_token(
        &self,
        admin_id: i64,
        token_hash: &str,
        expires_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), AppError> {
        match self {
            RecordStore::Postgres(pool) => {
                repo::refresh_token::insert(pool, admin_id, token_hash, expires_at).await
            }
            RecordStore::Memory(m) => {
                m.store_refresh_token(admin_id, token_hash, expires_at).await;
                Ok(())
            }
        }
    }

    pub async fn consume_refresh_token(
        &self,
        admin_id: i64,
        token_hash: &str,
    ) -> Result<bool, AppError> {
        match self {
            RecordStore::Postgres(pool) => {
                repo::refresh_token::consume(pool, admin_id, token_hash).await
            }
            RecordStore::Memory(m) => Ok(m.consume_refresh_token(admin_id, token_hash).await),
        }
    }

    pub async fn revoke_refresh_tokens(&self, admin_id: i64) -> Result<(), AppError> {
        match self {
            RecordStore::Postgres(pool) => repo::refresh_token::revoke_all(pool, admin_id).await,
            RecordStore::Memory(m) => {
                m.revoke_refresh_tokens(admin_id).await;
                Ok(())
            }
        }
    }
}
