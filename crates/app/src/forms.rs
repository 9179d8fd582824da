use uuid::Uuid;

use shared_types::{
    AppError, ConfidentialityOption, ParentForm, RequiredFields, StudentForm, TeacherForm,
};

use crate::backend::FormBackend;

pub const TEACHER_LOCKED: &str = "교사용 비밀번호를 먼저 입력해주세요.";
pub const WRONG_ACCESS_CODE: &str = "비밀번호가 일치하지 않습니다.";
pub const SUBMITTED: &str = "상담 신청이 접수되었습니다.";

/// Which screen of the public site is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Landing,
    Student,
    Parent,
    /// Access code prompt in front of the teacher form.
    TeacherGate,
    Teacher,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome {
    /// Stored. The draft was reset and the landing screen is showing.
    Submitted { id: Uuid },
    /// Nothing was sent. Labels of the empty required fields, in form order.
    Missing(Vec<&'static str>),
    /// The server refused or could not be reached. The draft is kept.
    Rejected(AppError),
}

impl FormOutcome {
    /// Text for the alert shown after a submit attempt.
    pub fn message(&self) -> String {
        match self {
            FormOutcome::Submitted { .. } => SUBMITTED.to_string(),
            FormOutcome::Missing(labels) => {
                format!("다음 항목을 입력해주세요: {}", labels.join(", "))
            }
            FormOutcome::Rejected(e) => e.message.clone(),
        }
    }
}

/// Drafts and navigation for the three public forms.
pub struct FormCapture<B> {
    backend: B,
    screen: Screen,
    /// Set once the teacher gate accepted a code.
    teacher_code: Option<String>,
    pub student: StudentForm,
    pub parent: ParentForm,
    pub teacher: TeacherForm,
}

impl<B: FormBackend> FormCapture<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            screen: Screen::Landing,
            teacher_code: None,
            student: StudentForm::default(),
            parent: ParentForm::default(),
            teacher: TeacherForm::default(),
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Navigate. The teacher form stays behind the gate until unlocked.
    pub fn open(&mut self, screen: Screen) {
        self.screen = match screen {
            Screen::Teacher if self.teacher_code.is_none() => Screen::TeacherGate,
            other => other,
        };
    }

    pub fn back_to_landing(&mut self) {
        self.screen = Screen::Landing;
    }

    pub fn teacher_unlocked(&self) -> bool {
        self.teacher_code.is_some()
    }

    /// Check a teacher access code. On success the teacher form opens.
    pub async fn unlock_teacher(&mut self, code: &str) -> Result<(), AppError> {
        if self.backend.check_teacher_code(code).await? {
            self.teacher_code = Some(code.to_string());
            self.screen = Screen::Teacher;
            Ok(())
        } else {
            tracing::info!("Teacher access code rejected");
            Err(AppError::forbidden(WRONG_ACCESS_CODE))
        }
    }

    /// Checkbox handler for the student confidentiality question.
    pub fn toggle_confidentiality(&mut self, option: ConfidentialityOption, checked: bool) {
        self.student.confidentiality.toggle(option, checked);
    }

    pub async fn submit_student(&mut self) -> FormOutcome {
        let missing = self.student.missing_fields();
        if !missing.is_empty() {
            return FormOutcome::Missing(missing);
        }
        let result = self.backend.submit_student(&self.student).await;
        self.finish(result, |capture| capture.student = StudentForm::default())
    }

    pub async fn submit_parent(&mut self) -> FormOutcome {
        let missing = self.parent.missing_fields();
        if !missing.is_empty() {
            return FormOutcome::Missing(missing);
        }
        let result = self.backend.submit_parent(&self.parent).await;
        self.finish(result, |capture| capture.parent = ParentForm::default())
    }

    /// Submit the teacher form with the code that unlocked it. The gate locks
    /// again after a successful submit.
    pub async fn submit_teacher(&mut self) -> FormOutcome {
        let Some(code) = self.teacher_code.clone() else {
            return FormOutcome::Rejected(AppError::forbidden(TEACHER_LOCKED));
        };
        let missing = self.teacher.missing_fields();
        if !missing.is_empty() {
            return FormOutcome::Missing(missing);
        }
        let result = self.backend.submit_teacher(&code, &self.teacher).await;
        self.finish(result, |capture| {
            capture.teacher = TeacherForm::default();
            capture.teacher_code = None;
        })
    }

    fn finish(
        &mut self,
        result: Result<shared_types::SubmitResponse, AppError>,
        reset: impl FnOnce(&mut Self),
    ) -> FormOutcome {
        match result {
            Ok(response) => {
                reset(self);
                self.screen = Screen::Landing;
                tracing::info!(record_id = %response.id, "Form submitted");
                FormOutcome::Submitted { id: response.id }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Form submission failed");
                FormOutcome::Rejected(e)
            }
        }
    }
}
