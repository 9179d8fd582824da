use std::collections::BTreeSet;

use futures::future::join_all;
use uuid::Uuid;

use shared_types::{
    AppError, AppErrorKind, BulkDeleteFailure, ExportDocument, Record, Role, Status,
};

use crate::backend::RecordBackend;

const PERMISSION_DENIED: &str = "권한이 없습니다. 다시 로그인해주세요.";

/// Client-side ordering of the loaded rows. The server always returns newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Name,
    /// Awaiting before completed, newest first within each.
    Status,
}

/// Two-click guard for deleting a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteStep {
    #[default]
    Idle,
    Armed(Uuid),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Banner {
    Error(String),
    Notice(String),
}

impl Banner {
    pub fn message(&self) -> &str {
        match self {
            Banner::Error(m) | Banner::Notice(m) => m,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Banner::Error(_))
    }
}

/// Result of a confirmed bulk delete. Each id stands alone.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BulkDeleteOutcome {
    pub deleted: Vec<Uuid>,
    pub failed: Vec<BulkDeleteFailure>,
}

impl BulkDeleteOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A rendered export ready to save.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// State of the admin dashboard for one role tab.
pub struct AdminWorkspace<B> {
    backend: B,
    role: Role,
    records: Vec<Record>,
    sort: SortOrder,
    detail: Option<Uuid>,
    selected: BTreeSet<Uuid>,
    delete_step: DeleteStep,
    bulk_pending: bool,
    banner: Option<Banner>,
}

impl<B: RecordBackend> AdminWorkspace<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            role: Role::Student,
            records: Vec::new(),
            sort: SortOrder::default(),
            detail: None,
            selected: BTreeSet::new(),
            delete_step: DeleteStep::Idle,
            bulk_pending: false,
            banner: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    fn fail(&mut self, context: &str, err: &AppError) {
        let message = match err.kind {
            AppErrorKind::Unauthorized | AppErrorKind::Forbidden => PERMISSION_DENIED.to_string(),
            _ => format!("{context}: {}", err.message),
        };
        tracing::warn!(role = %self.role, error = %err, "{context}");
        self.banner = Some(Banner::Error(message));
    }

    fn clear_selection(&mut self) {
        self.selected.clear();
        self.bulk_pending = false;
    }

    // ── Loading ─────────────────────────────────────────────────────

    /// Switch to `role` and fetch its records.
    ///
    /// Selection, pending confirmations and the open detail are dropped. On
    /// failure the list stays empty and a banner explains why.
    pub async fn load_tab(&mut self, role: Role) {
        self.role = role;
        self.records.clear();
        self.detail = None;
        self.delete_step = DeleteStep::Idle;
        self.banner = None;
        self.clear_selection();

        match self.backend.list(role).await {
            Ok(records) => self.records = records,
            Err(e) => self.fail("목록을 불러오지 못했습니다", &e),
        }
    }

    /// Reload the current tab.
    pub async fn refresh(&mut self) {
        self.load_tab(self.role).await;
    }

    pub fn sort_by(&mut self, order: SortOrder) {
        self.sort = order;
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort
    }

    /// Loaded rows in the current sort order.
    pub fn rows(&self) -> Vec<&Record> {
        let mut rows: Vec<&Record> = self.records.iter().collect();
        match self.sort {
            // Server order; records without a timestamp sink to the bottom.
            SortOrder::Newest => rows.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::Oldest => rows.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            SortOrder::Name => rows.sort_by(|a, b| a.subject_name().cmp(b.subject_name())),
            SortOrder::Status => rows.sort_by(|a, b| {
                status_rank(a.status)
                    .cmp(&status_rank(b.status))
                    .then_with(|| b.created_at.cmp(&a.created_at))
            }),
        }
        rows
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn find(&self, id: Uuid) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    fn find_mut(&mut self, id: Uuid) -> Option<&mut Record> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    // ── Detail ──────────────────────────────────────────────────────

    pub fn open_detail(&mut self, id: Uuid) -> Option<&Record> {
        if self.find(id).is_some() {
            self.detail = Some(id);
        }
        self.detail()
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    pub fn detail(&self) -> Option<&Record> {
        self.detail.and_then(|id| self.find(id))
    }

    // ── Status ──────────────────────────────────────────────────────

    /// Flip a record between awaiting and completed.
    pub async fn toggle_status(&mut self, id: Uuid) -> Result<Status, AppError> {
        let current = self
            .find(id)
            .map(|r| r.status)
            .ok_or_else(|| AppError::not_found(format!("Record {id} not loaded")))?;
        self.set_status(id, current.toggled()).await
    }

    /// Apply `status` locally, then persist it.
    ///
    /// The list and the open detail show the new value at once; if the write
    /// fails the old value comes back and a banner is raised.
    pub async fn set_status(&mut self, id: Uuid, status: Status) -> Result<Status, AppError> {
        let role = self.role;
        let previous = {
            let record = self
                .find_mut(id)
                .ok_or_else(|| AppError::not_found(format!("Record {id} not loaded")))?;
            std::mem::replace(&mut record.status, status)
        };

        match self.backend.set_status(role, id, status).await {
            Ok(stored) => {
                if let Some(record) = self.find_mut(id) {
                    record.status = stored.status;
                }
                Ok(stored.status)
            }
            Err(e) => {
                if let Some(record) = self.find_mut(id) {
                    record.status = previous;
                }
                self.fail("상태를 변경하지 못했습니다", &e);
                Err(e)
            }
        }
    }

    // ── Single delete ───────────────────────────────────────────────

    pub fn delete_step(&self) -> DeleteStep {
        self.delete_step
    }

    /// First call arms the row; a second call on the same row deletes it.
    ///
    /// Returns `Ok(true)` once the record is gone. Any delete clears the
    /// selection and closes the detail view if it showed this record.
    pub async fn delete_one(&mut self, id: Uuid) -> Result<bool, AppError> {
        if self.delete_step != DeleteStep::Armed(id) {
            self.delete_step = DeleteStep::Armed(id);
            return Ok(false);
        }
        self.delete_step = DeleteStep::Idle;

        if let Err(e) = self.backend.delete(self.role, id).await {
            self.fail("삭제하지 못했습니다", &e);
            return Err(e);
        }

        self.records.retain(|r| r.id != id);
        if self.detail == Some(id) {
            self.detail = None;
        }
        self.clear_selection();
        Ok(true)
    }

    pub fn cancel_delete(&mut self) {
        self.delete_step = DeleteStep::Idle;
    }

    // ── Selection ───────────────────────────────────────────────────

    pub fn selected(&self) -> &BTreeSet<Uuid> {
        &self.selected
    }

    pub fn is_selected(&self, id: Uuid) -> bool {
        self.selected.contains(&id)
    }

    /// "Select all" is disabled on an empty list.
    pub fn can_select_all(&self) -> bool {
        !self.records.is_empty()
    }

    pub fn all_selected(&self) -> bool {
        self.can_select_all() && self.selected.len() == self.records.len()
    }

    /// Any selection change drops a pending bulk-delete confirmation.
    pub fn select_all(&mut self, checked: bool) {
        self.bulk_pending = false;
        if checked {
            self.selected = self.records.iter().map(|r| r.id).collect();
        } else {
            self.selected.clear();
        }
    }

    pub fn toggle_select(&mut self, id: Uuid) {
        self.bulk_pending = false;
        if !self.selected.remove(&id) && self.find(id).is_some() {
            self.selected.insert(id);
        }
    }

    // ── Bulk delete ─────────────────────────────────────────────────

    pub fn bulk_pending(&self) -> bool {
        self.bulk_pending
    }

    /// Ask for confirmation. Returns false when nothing is selected.
    pub fn request_bulk_delete(&mut self) -> bool {
        self.bulk_pending = !self.selected.is_empty();
        self.bulk_pending
    }

    pub fn cancel_bulk_delete(&mut self) {
        self.bulk_pending = false;
    }

    /// Delete every selected record concurrently.
    ///
    /// Returns `None` unless a confirmation is pending for a non-empty
    /// selection. Failures leave their
    /// rows in place and raise a banner; the rest are removed. Selection and
    /// confirmation are cleared either way.
    pub async fn confirm_bulk_delete(&mut self) -> Option<BulkDeleteOutcome> {
        if !self.bulk_pending || self.selected.is_empty() {
            self.bulk_pending = false;
            return None;
        }

        let role = self.role;
        let ids: Vec<Uuid> = self.selected.iter().copied().collect();
        let backend = &self.backend;
        let results = join_all(ids.iter().map(|&id| async move {
            (id, backend.delete(role, id).await)
        }))
        .await;

        let mut outcome = BulkDeleteOutcome::default();
        for (id, result) in results {
            match result {
                Ok(()) => outcome.deleted.push(id),
                Err(e) => outcome.failed.push(BulkDeleteFailure {
                    id,
                    message: e.message,
                }),
            }
        }

        self.records.retain(|r| !outcome.deleted.contains(&r.id));
        if self.detail.is_some_and(|id| outcome.deleted.contains(&id)) {
            self.detail = None;
        }
        self.clear_selection();

        self.banner = Some(if outcome.is_complete() {
            Banner::Notice(format!("{}건을 삭제했습니다.", outcome.deleted.len()))
        } else {
            tracing::warn!(
                role = %role,
                deleted = outcome.deleted.len(),
                failed = outcome.failed.len(),
                "Bulk delete partially failed"
            );
            Banner::Error(format!(
                "{}건 중 {}건을 삭제하지 못했습니다.",
                ids.len(),
                outcome.failed.len()
            ))
        });

        Some(outcome)
    }

    // ── Export ──────────────────────────────────────────────────────

    /// What an export of this record would contain.
    pub fn export_preview(&self, id: Uuid) -> Option<ExportDocument> {
        self.find(id).map(ExportDocument::from_record)
    }

    /// Render the record to PDF. The filename is `{subject}_{form label}.pdf`.
    pub async fn export_one(&mut self, id: Uuid) -> Result<ExportedFile, AppError> {
        let document = self
            .export_preview(id)
            .ok_or_else(|| AppError::not_found(format!("Record {id} not loaded")))?;

        match self.backend.export_pdf(self.role, id).await {
            Ok(bytes) => Ok(ExportedFile {
                filename: document.filename("pdf"),
                bytes,
            }),
            Err(e) => {
                self.fail("내보내기에 실패했습니다", &e);
                Err(e)
            }
        }
    }
}

fn status_rank(status: Status) -> u8 {
    match status {
        Status::Awaiting => 0,
        Status::Completed => 1,
    }
}
