use axum::{extract::State, Json};

use shared_types::{
    AppError, ConfigKey, MessageResponse, NotificationConfig, TeacherAuthConfig,
    UpdateTeacherAccessRequest,
};

use crate::auth::extractors::AdminRequired;
use crate::db::AppState;
use crate::error_convert::ValidateRequest;
use crate::storage::RecordStore;

pub const DEMO_SETTINGS_UNAVAILABLE: &str = "데모 모드에서는 설정을 변경할 수 없습니다.";

fn ensure_not_demo(store: &RecordStore) -> Result<(), AppError> {
    if store.is_demo() {
        return Err(AppError::forbidden(DEMO_SETTINGS_UNAVAILABLE));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// /api/admin/settings/notifications
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/admin/settings/notifications",
    responses(
        (status = 200, description = "Current webhook settings", body = NotificationConfig),
        (status = 403, description = "Demo mode", body = AppError)
    ),
    tag = "settings"
)]
#[tracing::instrument(skip(store, _admin))]
pub async fn get_notifications(
    State(store): State<RecordStore>,
    _admin: AdminRequired,
) -> Result<Json<NotificationConfig>, AppError> {
    ensure_not_demo(&store)?;
    Ok(Json(store.notification_config().await?))
}

/// Replace the webhook settings.
#[utoipa::path(
    put,
    path = "/api/admin/settings/notifications",
    request_body = NotificationConfig,
    responses(
        (status = 200, description = "Settings saved", body = NotificationConfig),
        (status = 403, description = "Demo mode", body = AppError),
        (status = 422, description = "Enabled without a URL", body = AppError)
    ),
    tag = "settings"
)]
#[tracing::instrument(skip(store, admin, body))]
pub async fn put_notifications(
    State(store): State<RecordStore>,
    admin: AdminRequired,
    Json(body): Json<NotificationConfig>,
) -> Result<Json<NotificationConfig>, AppError> {
    ensure_not_demo(&store)?;

    let config = NotificationConfig {
        webhook_url: body.webhook_url.trim().to_string(),
        is_enabled: body.is_enabled,
    };
    if config.is_enabled && config.webhook_url.is_empty() {
        return Err(AppError::missing_fields(&["웹훅 URL"]));
    }

    store.put_config(ConfigKey::Notifications, &config).await?;
    tracing::info!(admin_id = admin.0.sub, enabled = config.is_enabled, "Notification settings saved");
    Ok(Json(config))
}

/// Send a test alert to the given webhook and report what happened.
#[utoipa::path(
    post,
    path = "/api/admin/settings/notifications/test",
    request_body = NotificationConfig,
    responses(
        (status = 200, description = "Test alert delivered", body = MessageResponse),
        (status = 400, description = "Delivery failed", body = AppError)
    ),
    tag = "settings"
)]
#[tracing::instrument(skip(state, _admin, body))]
pub async fn test_notification(
    State(state): State<AppState>,
    _admin: AdminRequired,
    Json(body): Json<NotificationConfig>,
) -> Result<Json<MessageResponse>, AppError> {
    ensure_not_demo(&state.store)?;

    state.notifier.send_test(&body).await.map_err(|e| {
        tracing::warn!(error = %e, "Test notification failed");
        AppError::bad_request(format!("테스트 알림 전송에 실패했습니다: {e}"))
    })?;

    Ok(Json(MessageResponse {
        message: "테스트 알림을 보냈습니다.".to_string(),
    }))
}

// ---------------------------------------------------------------------------
// /api/admin/settings/teacher-access
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/admin/settings/teacher-access",
    responses(
        (status = 200, description = "Current teacher access code", body = TeacherAuthConfig),
        (status = 403, description = "Demo mode", body = AppError)
    ),
    tag = "settings"
)]
#[tracing::instrument(skip(store, _admin))]
pub async fn get_teacher_access(
    State(store): State<RecordStore>,
    _admin: AdminRequired,
) -> Result<Json<TeacherAuthConfig>, AppError> {
    ensure_not_demo(&store)?;
    Ok(Json(store.teacher_auth_config().await?))
}

/// Change the teacher access code. Blank codes are rejected.
#[utoipa::path(
    put,
    path = "/api/admin/settings/teacher-access",
    request_body = UpdateTeacherAccessRequest,
    responses(
        (status = 200, description = "Code changed", body = TeacherAuthConfig),
        (status = 403, description = "Demo mode", body = AppError),
        (status = 422, description = "Blank code", body = AppError)
    ),
    tag = "settings"
)]
#[tracing::instrument(skip(store, admin, body))]
pub async fn put_teacher_access(
    State(store): State<RecordStore>,
    admin: AdminRequired,
    Json(body): Json<UpdateTeacherAccessRequest>,
) -> Result<Json<TeacherAuthConfig>, AppError> {
    ensure_not_demo(&store)?;
    body.validate_request()?;
    if body.password.trim().is_empty() {
        return Err(AppError::missing_fields(&["비밀번호"]));
    }

    let config = TeacherAuthConfig {
        password: body.password,
    };
    store.put_config(ConfigKey::TeacherAuth, &config).await?;
    tracing::info!(admin_id = admin.0.sub, "Teacher access code changed");
    Ok(Json(config))
}
