use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::OnceLock;
use std::time::Instant;

use crate::storage::RecordStore;

static STARTED: OnceLock<Instant> = OnceLock::new();

/// Mark process start for the uptime counter.
pub fn record_start_time() {
    STARTED.get_or_init(Instant::now);
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    /// `ok` when the store answers, `degraded` otherwise.
    pub status: &'static str,
    /// `postgres`, `memory`, or `demo`.
    pub store: &'static str,
    /// `connected` or the ping error.
    pub db: String,
    pub demo: bool,
    pub uptime_seconds: u64,
    pub version: &'static str,
}

/// Liveness probe. Always 200 so load balancers can tell a slow database
/// from a dead process; read `status` for the store's state.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Process is up", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(store): State<RecordStore>) -> Json<HealthResponse> {
    let (status, db) = match store.ping().await {
        Ok(()) => ("ok", "connected".to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "Health ping failed");
            ("degraded", e.message)
        }
    };

    Json(HealthResponse {
        status,
        store: store.backend_name(),
        db,
        demo: store.is_demo(),
        uptime_seconds: STARTED.get().map_or(0, |t| t.elapsed().as_secs()),
        version: env!("CARGO_PKG_VERSION"),
    })
}
