use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use shared_types::{
    AppError, BulkDeleteFailure, BulkDeleteRequest, BulkDeleteResponse, ExportDocument, Record,
    RecordListResponse, Role, UpdateStatusRequest, LIST_LIMIT,
};

use crate::auth::extractors::AdminRequired;
use crate::error_convert::ValidateRequest;
use crate::storage::RecordStore;

const ALREADY_GONE: &str = "이미 삭제되었거나 존재하지 않는 항목입니다.";

fn parse_role(role: &str) -> Result<Role, AppError> {
    role.parse()
        .map_err(|_| AppError::bad_request(format!("Unknown form type: {role}")))
}

fn parse_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::bad_request("Invalid UUID format"))
}

async fn load(store: &RecordStore, role: Role, id: Uuid) -> Result<Record, AppError> {
    store
        .find(role, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Record {id} not found")))
}

// ---------------------------------------------------------------------------
// GET /api/admin/{role}/records
// ---------------------------------------------------------------------------

/// Most recent submissions of one form type, newest first.
#[utoipa::path(
    get,
    path = "/api/admin/{role}/records",
    params(("role" = String, Path, description = "student, parent, or teacher")),
    responses(
        (status = 200, description = "Recent records", body = RecordListResponse),
        (status = 401, description = "Not signed in", body = AppError)
    ),
    tag = "records"
)]
#[tracing::instrument(skip(store, _admin))]
pub async fn list_records(
    State(store): State<RecordStore>,
    _admin: AdminRequired,
    Path(role): Path<String>,
) -> Result<Json<RecordListResponse>, AppError> {
    let role = parse_role(&role)?;
    let records = store.list_recent(role, LIST_LIMIT).await?;
    Ok(Json(RecordListResponse {
        records,
        limit: LIST_LIMIT,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/admin/{role}/records/{id}
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/admin/{role}/records/{id}",
    params(
        ("role" = String, Path, description = "student, parent, or teacher"),
        ("id" = String, Path, description = "Record UUID")
    ),
    responses(
        (status = 200, description = "Record found", body = Record),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "records"
)]
#[tracing::instrument(skip(store, _admin))]
pub async fn get_record(
    State(store): State<RecordStore>,
    _admin: AdminRequired,
    Path((role, id)): Path<(String, String)>,
) -> Result<Json<Record>, AppError> {
    let record = load(&store, parse_role(&role)?, parse_id(&id)?).await?;
    Ok(Json(record))
}

// ---------------------------------------------------------------------------
// PATCH /api/admin/{role}/records/{id}/status
// ---------------------------------------------------------------------------

/// Set the processing status. Only the status field is written.
#[utoipa::path(
    patch,
    path = "/api/admin/{role}/records/{id}/status",
    params(
        ("role" = String, Path, description = "student, parent, or teacher"),
        ("id" = String, Path, description = "Record UUID")
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = Record),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "records"
)]
#[tracing::instrument(skip(store, admin))]
pub async fn update_status(
    State(store): State<RecordStore>,
    admin: AdminRequired,
    Path((role, id)): Path<(String, String)>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<Record>, AppError> {
    let (role, id) = (parse_role(&role)?, parse_id(&id)?);
    let record = store
        .update_status(role, id, body.status)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Record {id} not found")))?;
    tracing::info!(admin_id = admin.0.sub, record_id = %id, status = %body.status.as_str(), "Status changed");
    Ok(Json(record))
}

// ---------------------------------------------------------------------------
// DELETE /api/admin/{role}/records/{id}
// ---------------------------------------------------------------------------

#[utoipa::path(
    delete,
    path = "/api/admin/{role}/records/{id}",
    params(
        ("role" = String, Path, description = "student, parent, or teacher"),
        ("id" = String, Path, description = "Record UUID")
    ),
    responses(
        (status = 204, description = "Record deleted"),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "records"
)]
#[tracing::instrument(skip(store, admin))]
pub async fn delete_record(
    State(store): State<RecordStore>,
    admin: AdminRequired,
    Path((role, id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let (role, id) = (parse_role(&role)?, parse_id(&id)?);
    if !store.delete(role, id).await? {
        return Err(AppError::not_found(ALREADY_GONE));
    }
    tracing::info!(admin_id = admin.0.sub, record_id = %id, "Record deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// POST /api/admin/{role}/records/bulk-delete
// ---------------------------------------------------------------------------

/// Delete several records. Each id succeeds or fails on its own; the
/// response lists both sides.
#[utoipa::path(
    post,
    path = "/api/admin/{role}/records/bulk-delete",
    params(("role" = String, Path, description = "student, parent, or teacher")),
    request_body = BulkDeleteRequest,
    responses(
        (status = 200, description = "Per-id outcome", body = BulkDeleteResponse),
        (status = 422, description = "Empty selection", body = AppError)
    ),
    tag = "records"
)]
#[tracing::instrument(skip(store, admin, body), fields(count = body.ids.len()))]
pub async fn bulk_delete(
    State(store): State<RecordStore>,
    admin: AdminRequired,
    Path(role): Path<String>,
    Json(body): Json<BulkDeleteRequest>,
) -> Result<Json<BulkDeleteResponse>, AppError> {
    let role = parse_role(&role)?;
    body.validate_request()?;

    let mut outcome = BulkDeleteResponse::default();
    for id in body.ids {
        match store.delete(role, id).await {
            Ok(true) => outcome.deleted.push(id),
            Ok(false) => outcome.failed.push(BulkDeleteFailure {
                id,
                message: ALREADY_GONE.to_string(),
            }),
            Err(e) => {
                tracing::warn!(record_id = %id, error = %e, "Bulk delete item failed");
                outcome.failed.push(BulkDeleteFailure {
                    id,
                    message: e.message,
                });
            }
        }
    }

    tracing::info!(
        admin_id = admin.0.sub,
        deleted = outcome.deleted.len(),
        failed = outcome.failed.len(),
        "Bulk delete finished"
    );
    Ok(Json(outcome))
}

// ---------------------------------------------------------------------------
// GET /api/admin/{role}/records/{id}/export
// ---------------------------------------------------------------------------

/// `attachment` disposition with an ASCII fallback and the UTF-8 name.
fn content_disposition(filename: &str) -> HeaderValue {
    let value = format!(
        "attachment; filename=\"export.pdf\"; filename*=UTF-8''{}",
        urlencoding::encode(filename)
    );
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

/// Download the record as a PDF document.
#[utoipa::path(
    get,
    path = "/api/admin/{role}/records/{id}/export",
    params(
        ("role" = String, Path, description = "student, parent, or teacher"),
        ("id" = String, Path, description = "Record UUID")
    ),
    responses(
        (status = 200, description = "Rendered PDF", content_type = "application/pdf"),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "records"
)]
#[tracing::instrument(skip(store, _admin))]
pub async fn export_record(
    State(store): State<RecordStore>,
    _admin: AdminRequired,
    Path((role, id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let record = load(&store, parse_role(&role)?, parse_id(&id)?).await?;
    let document = ExportDocument::from_record(&record);
    let pdf_bytes = crate::typst::render_export_pdf(&document).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&document.filename("pdf")),
            ),
        ],
        pdf_bytes,
    )
        .into_response())
}

// ---------------------------------------------------------------------------
// GET /api/admin/{role}/records/{id}/export/preview
// ---------------------------------------------------------------------------

/// The document an export would contain, as JSON.
#[utoipa::path(
    get,
    path = "/api/admin/{role}/records/{id}/export/preview",
    params(
        ("role" = String, Path, description = "student, parent, or teacher"),
        ("id" = String, Path, description = "Record UUID")
    ),
    responses(
        (status = 200, description = "Export contents", body = ExportDocument),
        (status = 404, description = "Not found", body = AppError)
    ),
    tag = "records"
)]
#[tracing::instrument(skip(store, _admin))]
pub async fn export_preview(
    State(store): State<RecordStore>,
    _admin: AdminRequired,
    Path((role, id)): Path<(String, String)>,
) -> Result<Json<ExportDocument>, AppError> {
    let record = load(&store, parse_role(&role)?, parse_id(&id)?).await?;
    Ok(Json(ExportDocument::from_record(&record)))
}
