use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::{ParentForm, StudentForm, TeacherForm};

/// Most recent records returned per role.
pub const LIST_LIMIT: usize = 50;

/// Applicant role. Each role owns its own record collection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Parent,
    Teacher,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Student, Role::Parent, Role::Teacher];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Parent => "parent",
            Role::Teacher => "teacher",
        }
    }

    /// Backing collection (table) name.
    pub fn collection(&self) -> &'static str {
        match self {
            Role::Student => "counseling_student",
            Role::Parent => "counseling_parent",
            Role::Teacher => "counseling_teacher",
        }
    }

    /// Name of the form type, used in export titles and filenames.
    pub fn form_label(&self) -> &'static str {
        match self {
            Role::Student => "학생 상담 신청서",
            Role::Parent => "학부모 상담 신청서",
            Role::Teacher => "교사 상담 의뢰서",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "parent" => Ok(Role::Parent),
            "teacher" => Ok(Role::Teacher),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}

/// Workflow status of a record. Admins toggle it manually; nothing else writes it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Status {
    #[default]
    #[serde(rename = "접수대기", alias = "awaiting")]
    Awaiting,
    #[serde(rename = "상담완료", alias = "completed")]
    Completed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Awaiting => "접수대기",
            Status::Completed => "상담완료",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Status::Awaiting => Status::Completed,
            Status::Completed => Status::Awaiting,
        }
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "접수대기" | "awaiting" => Ok(Status::Awaiting),
            "상담완료" | "completed" => Ok(Status::Completed),
            other => Err(format!("Unknown status: {other}")),
        }
    }
}

/// Role-specific payload of a record, discriminated by `role`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RecordBody {
    Student(StudentForm),
    Parent(ParentForm),
    Teacher(TeacherForm),
}

impl RecordBody {
    pub fn role(&self) -> Role {
        match self {
            RecordBody::Student(_) => Role::Student,
            RecordBody::Parent(_) => Role::Parent,
            RecordBody::Teacher(_) => Role::Teacher,
        }
    }

    /// The person the record is about.
    pub fn subject_name(&self) -> &str {
        match self {
            RecordBody::Student(f) => &f.name,
            RecordBody::Parent(f) => &f.child_name,
            RecordBody::Teacher(f) => &f.student_name,
        }
    }

    pub fn grade_class(&self) -> &str {
        match self {
            RecordBody::Student(f) => &f.grade_class,
            RecordBody::Parent(f) => &f.grade_class,
            RecordBody::Teacher(f) => &f.grade_class,
        }
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        match self {
            RecordBody::Student(f) => f.missing_fields(),
            RecordBody::Parent(f) => f.missing_fields(),
            RecordBody::Teacher(f) => f.missing_fields(),
        }
    }
}

/// One stored submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Record {
    pub id: Uuid,
    pub status: Status,
    /// Assigned by the store. Absent only on records imported without one.
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub body: RecordBody,
}

impl Record {
    pub fn role(&self) -> Role {
        self.body.role()
    }

    pub fn subject_name(&self) -> &str {
        self.body.subject_name()
    }
}

/// Role-specific required-field check.
pub trait RequiredFields {
    /// Human-readable labels of the missing required fields, in form order.
    fn missing_fields(&self) -> Vec<&'static str>;

    fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// Whitespace-only input counts as missing.
pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Collect labels for every `(label, value)` pair whose value is blank.
pub(crate) fn blank_labels(fields: &[(&'static str, &str)]) -> Vec<&'static str> {
    fields
        .iter()
        .filter(|(_, value)| is_blank(value))
        .map(|(label, _)| *label)
        .collect()
}
