use axum::{extract::DefaultBodyLimit, middleware, Router};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use shared_types::{
    AdminUser, AppError, AppErrorKind, AuthResponse, BulkDeleteFailure, BulkDeleteRequest,
    BulkDeleteResponse, ConfidentialityOption, Emotion, ExportDocument, ExportEntry,
    LoginRequest, MessageResponse, NotificationConfig, ParentForm, ParentRelation,
    PreferredTime, Record, RecordBody, RecordListResponse, Role, Severity, Status, StudentForm,
    SubmitResponse, TeacherAccessRequest, TeacherAccessResponse, TeacherAuthConfig, TeacherForm,
    TeacherSubmission, UpdateStatusRequest, UpdateTeacherAccessRequest,
};

use crate::auth::middleware::auth_middleware;
use crate::db::AppState;
use crate::health;
use crate::rest::{self, auth, forms, records, settings};
use crate::telemetry::OtelTraceLayer;

/// Largest accepted request body. Forms are a few kilobytes of text.
const MAX_BODY_BYTES: usize = 256 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Form capture
        forms::submit_student,
        forms::submit_parent,
        forms::teacher_access,
        forms::submit_teacher,
        // Session
        auth::login,
        auth::logout,
        auth::session,
        // Admin records
        records::list_records,
        records::get_record,
        records::update_status,
        records::delete_record,
        records::bulk_delete,
        records::export_record,
        records::export_preview,
        // Settings
        settings::get_notifications,
        settings::put_notifications,
        settings::test_notification,
        settings::get_teacher_access,
        settings::put_teacher_access,
        health::health_check,
    ),
    components(schemas(
        AppError, AppErrorKind, MessageResponse,
        Role, Status, Record, RecordBody, RecordListResponse, UpdateStatusRequest,
        StudentForm, ConfidentialityOption, PreferredTime,
        ParentForm, ParentRelation,
        TeacherForm, TeacherSubmission, Severity, Emotion,
        SubmitResponse, TeacherAccessRequest, TeacherAccessResponse,
        BulkDeleteRequest, BulkDeleteResponse, BulkDeleteFailure,
        ExportDocument, ExportEntry,
        LoginRequest, AuthResponse, AdminUser,
        NotificationConfig, TeacherAuthConfig, UpdateTeacherAccessRequest,
        health::HealthResponse,
    )),
    tags(
        (name = "forms", description = "Public counseling request forms"),
        (name = "auth", description = "Administrator sign-in and session"),
        (name = "records", description = "Submission review, status, export, and deletion"),
        (name = "settings", description = "Notification webhook and teacher access code"),
        (name = "health", description = "Health check endpoint")
    ),
    info(
        title = "Counseling Intake API",
        description = "School counseling request intake and review",
        version = "1.0.0"
    )
)]
pub struct ApiDoc;

/// Build the full application router: REST API, `/health`, optional API
/// docs at `/docs`, and the request-scoped layers (auth, request ids,
/// optional OTel spans).
pub fn build_router(state: AppState) -> Router {
    let flags = crate::config::feature_flags();

    let mut router = Router::new()
        .merge(rest::api_router(state.login_limiter.clone()))
        .route("/health", axum::routing::get(health::health_check))
        .with_state(state.clone());

    if flags.api_docs {
        router = router.merge(Scalar::with_url("/docs", ApiDoc::openapi()));
    }

    if flags.telemetry {
        router = router.layer(OtelTraceLayer);
    }

    router
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn_with_state(state.store, auth_middleware))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
