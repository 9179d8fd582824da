use axum::{extract::State, http::StatusCode, Json};

use shared_types::{
    AppError, ParentForm, RecordBody, StudentForm, SubmitResponse, TeacherAccessRequest,
    TeacherAccessResponse, TeacherSubmission,
};

use crate::db::AppState;
use crate::error_convert::ValidateRequest;
use crate::storage::RecordStore;

pub const DEMO_SUBMIT_REFUSED: &str = "데모 모드에서는 신청서를 제출할 수 없습니다.";
pub const WRONG_ACCESS_CODE: &str = "비밀번호가 일치하지 않습니다.";

/// Validate, store, and announce a submission.
async fn submit(state: &AppState, body: RecordBody) -> Result<(StatusCode, Json<SubmitResponse>), AppError> {
    if state.store.is_demo() {
        return Err(AppError::forbidden(DEMO_SUBMIT_REFUSED));
    }

    let missing = body.missing_fields();
    if !missing.is_empty() {
        return Err(AppError::missing_fields(&missing));
    }

    let record = state.store.create(body).await?;
    tracing::info!(record_id = %record.id, role = %record.role(), "Submission stored");

    // Alerts never hold up or fail the submission.
    let notifier = state.notifier.clone();
    let store = state.store.clone();
    let announced = record.clone();
    tokio::spawn(async move {
        notifier.dispatch(&store, &announced).await;
    });

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            id: record.id,
            status: record.status,
            created_at: record.created_at,
        }),
    ))
}

/// Whether `code` unlocks the teacher form. An unreadable config falls back
/// to the default code rather than locking teachers out.
async fn teacher_code_matches(store: &RecordStore, code: &str) -> bool {
    let config = store.teacher_auth_config().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Teacher access config unreadable; using default code");
        Default::default()
    });
    config.accepts(code)
}

// ---------------------------------------------------------------------------
// POST /api/forms/student
// ---------------------------------------------------------------------------

/// Submit a student counseling request.
#[utoipa::path(
    post,
    path = "/api/forms/student",
    request_body = StudentForm,
    responses(
        (status = 201, description = "Request stored", body = SubmitResponse),
        (status = 403, description = "Demo mode", body = AppError),
        (status = 422, description = "Missing or invalid fields", body = AppError)
    ),
    tag = "forms"
)]
#[tracing::instrument(skip(state, form))]
pub async fn submit_student(
    State(state): State<AppState>,
    Json(mut form): Json<StudentForm>,
) -> Result<(StatusCode, Json<SubmitResponse>), AppError> {
    form.validate_request()?;
    form.confidentiality = std::mem::take(&mut form.confidentiality).normalized();
    submit(&state, RecordBody::Student(form)).await
}

// ---------------------------------------------------------------------------
// POST /api/forms/parent
// ---------------------------------------------------------------------------

/// Submit a parent counseling request.
#[utoipa::path(
    post,
    path = "/api/forms/parent",
    request_body = ParentForm,
    responses(
        (status = 201, description = "Request stored", body = SubmitResponse),
        (status = 403, description = "Demo mode", body = AppError),
        (status = 422, description = "Missing or invalid fields", body = AppError)
    ),
    tag = "forms"
)]
#[tracing::instrument(skip(state, form))]
pub async fn submit_parent(
    State(state): State<AppState>,
    Json(form): Json<ParentForm>,
) -> Result<(StatusCode, Json<SubmitResponse>), AppError> {
    form.validate_request()?;
    submit(&state, RecordBody::Parent(form)).await
}

// ---------------------------------------------------------------------------
// POST /api/forms/teacher/access
// ---------------------------------------------------------------------------

/// Check the shared code that unlocks the teacher referral form.
#[utoipa::path(
    post,
    path = "/api/forms/teacher/access",
    request_body = TeacherAccessRequest,
    responses(
        (status = 200, description = "Code accepted", body = TeacherAccessResponse),
        (status = 403, description = "Wrong code", body = AppError)
    ),
    tag = "forms"
)]
#[tracing::instrument(skip(store, body))]
pub async fn teacher_access(
    State(store): State<RecordStore>,
    Json(body): Json<TeacherAccessRequest>,
) -> Result<Json<TeacherAccessResponse>, AppError> {
    if !teacher_code_matches(&store, &body.code).await {
        return Err(AppError::forbidden(WRONG_ACCESS_CODE));
    }
    Ok(Json(TeacherAccessResponse { granted: true }))
}

// ---------------------------------------------------------------------------
// POST /api/forms/teacher
// ---------------------------------------------------------------------------

/// Submit a teacher referral. The body repeats the access code.
#[utoipa::path(
    post,
    path = "/api/forms/teacher",
    request_body = TeacherSubmission,
    responses(
        (status = 201, description = "Referral stored", body = SubmitResponse),
        (status = 403, description = "Wrong access code or demo mode", body = AppError),
        (status = 422, description = "Missing or invalid fields", body = AppError)
    ),
    tag = "forms"
)]
#[tracing::instrument(skip(state, submission))]
pub async fn submit_teacher(
    State(state): State<AppState>,
    Json(submission): Json<TeacherSubmission>,
) -> Result<(StatusCode, Json<SubmitResponse>), AppError> {
    if !teacher_code_matches(&state.store, &submission.access_code).await {
        return Err(AppError::forbidden(WRONG_ACCESS_CODE));
    }
    submission.form.validate_request()?;
    submit(&state, RecordBody::Teacher(submission.form)).await
}
