use axum::extract::FromRef;
use shared_types::AppError;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};

use crate::config::{env_parse, env_value};
use crate::notify::Notifier;
use crate::rate_limit::RateLimitState;
use crate::storage::RecordStore;

/// Shared application state passed to Axum handlers via `State`.
/// Derives `FromRef` so handlers can extract `State<RecordStore>` directly.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub store: RecordStore,
    pub notifier: Notifier,
    pub login_limiter: RateLimitState,
}

impl AppState {
    pub fn new(store: RecordStore) -> Self {
        Self {
            store,
            notifier: Notifier::new(),
            login_limiter: RateLimitState::for_login(),
        }
    }
}

/// Create a connection pool. Uses `connect_lazy` so no connections open
/// until the first query.
pub fn create_pool(database_url: &str) -> Result<Pool<Postgres>, AppError> {
    let max_connections: u32 = env_parse("DATABASE_MAX_CONNECTIONS", 10);

    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect_lazy(database_url)
        .map_err(|e| AppError::database(format!("Invalid DATABASE_URL: {e}")))
}

/// Run database migrations against the given pool.
pub async fn run_migrations(pool: &Pool<Postgres>) -> Result<(), AppError> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| AppError::database(format!("Migration failed: {e}")))
}

/// Choose the backend from the environment.
///
/// With `DATABASE_URL` the Postgres store is used and migrated. Without it the
/// app starts in demo mode on seeded, in-memory data and refuses writes.
pub async fn store_from_env() -> Result<RecordStore, AppError> {
    match env_value("DATABASE_URL") {
        Some(url) => {
            let pool = create_pool(&url)?;
            run_migrations(&pool).await?;
            tracing::info!("Connected to Postgres record store");
            Ok(RecordStore::Postgres(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; starting in demo mode with sample data");
            Ok(RecordStore::demo())
        }
    }
}
