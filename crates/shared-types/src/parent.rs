use serde::{Deserialize, Serialize};

use crate::record::{blank_labels, RequiredFields};

/// Applicant's relation to the child.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum ParentRelation {
    #[serde(rename = "아빠")]
    Father,
    #[serde(rename = "엄마")]
    Mother,
    #[serde(rename = "기타")]
    Other,
}

impl ParentRelation {
    pub fn label(&self) -> &'static str {
        match self {
            ParentRelation::Father => "아빠",
            ParentRelation::Mother => "엄마",
            ParentRelation::Other => "기타",
        }
    }
}

/// Parent / guardian counseling request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "validation", derive(validator::Validate))]
#[serde(rename_all = "camelCase")]
pub struct ParentForm {
    #[serde(default)]
    pub child_name: String,
    #[serde(default)]
    pub grade_class: String,
    #[serde(default)]
    pub relation: Option<ParentRelation>,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub desired_time: String,
    #[serde(default)]
    pub worries: String,
    #[serde(default)]
    pub examples: String,
    #[serde(default)]
    pub onset_and_cause: String,
    #[serde(default)]
    pub attempts_and_effects: String,
    #[serde(default)]
    pub desired_change: String,
    #[serde(default)]
    pub strengths: String,
    #[serde(default)]
    pub favorite_activities: String,
    #[serde(default)]
    pub medical_history: Option<bool>,
    #[serde(default)]
    pub medical_history_detail: String,
    /// 1 to 10.
    #[cfg_attr(
        feature = "validation",
        validate(range(min = 1, max = 10, message = "1에서 10 사이의 값이어야 합니다"))
    )]
    #[serde(default)]
    pub mother_relation_score: Option<u8>,
    #[cfg_attr(
        feature = "validation",
        validate(range(min = 1, max = 10, message = "1에서 10 사이의 값이어야 합니다"))
    )]
    #[serde(default)]
    pub father_relation_score: Option<u8>,
    #[serde(default)]
    pub temperament: String,
    #[serde(default)]
    pub exceptional_situations: String,
    #[serde(default)]
    pub note: String,
}

impl RequiredFields for ParentForm {
    fn missing_fields(&self) -> Vec<&'static str> {
        blank_labels(&[
            ("자녀 이름", &self.child_name),
            ("학년/반", &self.grade_class),
            ("걱정되는 점", &self.worries),
            ("기대하는 변화", &self.desired_change),
        ])
    }
}
