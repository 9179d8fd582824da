use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::record::{blank_labels, RequiredFields};

/// Three-level rating used for attention and behavior items.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[serde(alias = "1")]
    Mild,
    #[serde(alias = "2")]
    Moderate,
    #[serde(alias = "3")]
    Severe,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Mild => "양호함",
            Severity::Moderate => "조금 심함",
            Severity::Severe => "매우 심함",
        }
    }
}

/// Dominant emotions a teacher can observe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Emotion {
    #[serde(rename = "불안")]
    Anxiety,
    #[serde(rename = "우울")]
    Depression,
    #[serde(rename = "분노")]
    Anger,
    #[serde(rename = "위축")]
    Withdrawal,
    #[serde(rename = "무기력")]
    Lethargy,
    #[serde(rename = "짜증")]
    Irritability,
    #[serde(rename = "기쁨")]
    Joy,
    #[serde(rename = "평온")]
    Calm,
    #[serde(rename = "예민함")]
    Sensitivity,
    #[serde(rename = "기타")]
    Other,
}

impl Emotion {
    pub const ALL: [Emotion; 10] = [
        Emotion::Anxiety,
        Emotion::Depression,
        Emotion::Anger,
        Emotion::Withdrawal,
        Emotion::Lethargy,
        Emotion::Irritability,
        Emotion::Joy,
        Emotion::Calm,
        Emotion::Sensitivity,
        Emotion::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Emotion::Anxiety => "불안",
            Emotion::Depression => "우울",
            Emotion::Anger => "분노",
            Emotion::Withdrawal => "위축",
            Emotion::Lethargy => "무기력",
            Emotion::Irritability => "짜증",
            Emotion::Joy => "기쁨",
            Emotion::Calm => "평온",
            Emotion::Sensitivity => "예민함",
            Emotion::Other => "기타",
        }
    }
}

/// Teacher referral form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "validation", derive(validator::Validate))]
#[serde(rename_all = "camelCase")]
pub struct TeacherForm {
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub grade_class: String,
    #[serde(default)]
    pub referral_reason: String,
    #[serde(default)]
    pub desired_change: String,
    #[serde(default)]
    pub strengths: String,
    #[serde(default)]
    pub favorite_activities: String,
    #[cfg_attr(
        feature = "validation",
        validate(range(min = 1, max = 5, message = "1에서 5 사이의 값이어야 합니다"))
    )]
    #[serde(default)]
    pub peer_relation: Option<u8>,
    #[cfg_attr(
        feature = "validation",
        validate(range(min = 1, max = 5, message = "1에서 5 사이의 값이어야 합니다"))
    )]
    #[serde(default)]
    pub class_attitude: Option<u8>,
    #[cfg_attr(
        feature = "validation",
        validate(range(min = 1, max = 5, message = "1에서 5 사이의 값이어야 합니다"))
    )]
    #[serde(default)]
    pub learning_ability: Option<u8>,
    #[cfg_attr(
        feature = "validation",
        validate(range(min = 1, max = 5, message = "1에서 5 사이의 값이어야 합니다"))
    )]
    #[serde(default)]
    pub compliance: Option<u8>,
    #[serde(default)]
    pub inattention: Option<Severity>,
    #[serde(default)]
    pub impulsivity: Option<Severity>,
    #[serde(default)]
    pub aggression: Option<Severity>,
    #[serde(default)]
    pub behavioral_examples: String,
    /// Kept in checklist order, whatever order they were ticked in.
    #[serde(default)]
    pub emotions: BTreeSet<Emotion>,
    #[serde(default)]
    pub other_emotion_detail: String,
    #[serde(default)]
    pub repetitive_behavior: Option<bool>,
    #[serde(default)]
    pub repetitive_behavior_detail: String,
    #[serde(default)]
    pub frequency: String,
    /// Narrative answer about how serious the problem is.
    #[serde(default)]
    pub severity: String,
}

impl RequiredFields for TeacherForm {
    fn missing_fields(&self) -> Vec<&'static str> {
        blank_labels(&[
            ("학생 이름", &self.student_name),
            ("학년/반", &self.grade_class),
            ("의뢰 사유", &self.referral_reason),
            ("기대하는 변화", &self.desired_change),
        ])
    }
}

/// Teacher form as submitted, carrying the shared access code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TeacherSubmission {
    pub access_code: String,
    #[serde(flatten)]
    pub form: TeacherForm,
}
