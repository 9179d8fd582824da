pub mod auth;
pub mod forms;
pub mod records;
pub mod settings;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use crate::db::AppState;
use crate::rate_limit::{rate_limit_middleware, RateLimitState};

/// Build the REST API router: public form capture, auth, and the admin
/// workspace endpoints.
pub fn api_router(login_limiter: RateLimitState) -> Router<AppState> {
    let sign_in = Router::new()
        .route("/api/auth/login", post(auth::login))
        .route_layer(middleware::from_fn_with_state(
            login_limiter,
            rate_limit_middleware,
        ));

    Router::new()
        // Form capture
        .route("/api/forms/student", post(forms::submit_student))
        .route("/api/forms/parent", post(forms::submit_parent))
        .route("/api/forms/teacher", post(forms::submit_teacher))
        .route("/api/forms/teacher/access", post(forms::teacher_access))
        // Session
        .merge(sign_in)
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/session", get(auth::session))
        // Settings (static segment wins over `{role}`)
        .route(
            "/api/admin/settings/notifications",
            get(settings::get_notifications).put(settings::put_notifications),
        )
        .route(
            "/api/admin/settings/notifications/test",
            post(settings::test_notification),
        )
        .route(
            "/api/admin/settings/teacher-access",
            get(settings::get_teacher_access).put(settings::put_teacher_access),
        )
        // Records
        .route("/api/admin/{role}/records", get(records::list_records))
        .route(
            "/api/admin/{role}/records/bulk-delete",
            post(records::bulk_delete),
        )
        .route(
            "/api/admin/{role}/records/{id}",
            get(records::get_record).delete(records::delete_record),
        )
        .route(
            "/api/admin/{role}/records/{id}/status",
            patch(records::update_status),
        )
        .route(
            "/api/admin/{role}/records/{id}/export",
            get(records::export_record),
        )
        .route(
            "/api/admin/{role}/records/{id}/export/preview",
            get(records::export_preview),
        )
}
