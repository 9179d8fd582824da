use shared_types::{
    AppError, ParentForm, Record, Role, Status, StudentForm, SubmitResponse, TeacherForm,
};
use uuid::Uuid;

/// Record operations the admin dashboard needs.
///
/// `ApiClient` implements this over HTTP; tests substitute an in-memory fake.
#[allow(async_fn_in_trait)]
pub trait RecordBackend: Send + Sync {
    /// Most recent records of one role, newest first, at most `LIST_LIMIT`.
    async fn list(&self, role: Role) -> Result<Vec<Record>, AppError>;

    /// Write only the status field. Returns the stored record.
    async fn set_status(&self, role: Role, id: Uuid, status: Status) -> Result<Record, AppError>;

    async fn delete(&self, role: Role, id: Uuid) -> Result<(), AppError>;

    /// Rendered PDF bytes.
    async fn export_pdf(&self, role: Role, id: Uuid) -> Result<Vec<u8>, AppError>;
}

/// Public form submission.
#[allow(async_fn_in_trait)]
pub trait FormBackend: Send + Sync {
    async fn submit_student(&self, form: &StudentForm) -> Result<SubmitResponse, AppError>;

    async fn submit_parent(&self, form: &ParentForm) -> Result<SubmitResponse, AppError>;

    /// Whether `code` opens the teacher form.
    async fn check_teacher_code(&self, code: &str) -> Result<bool, AppError>;

    async fn submit_teacher(
        &self,
        access_code: &str,
        form: &TeacherForm,
    ) -> Result<SubmitResponse, AppError>;
}
