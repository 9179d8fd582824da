use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::record::{blank_labels, RequiredFields};

/// One checkbox on the "who may know about this request" question.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum ConfidentialityOption {
    #[serde(rename = "부모님")]
    Guardian,
    #[serde(rename = "담임 선생님")]
    HomeroomTeacher,
    #[serde(rename = "알리고 싶지 않음")]
    NoDisclosure,
}

impl ConfidentialityOption {
    pub fn label(&self) -> &'static str {
        match self {
            ConfidentialityOption::Guardian => "부모님",
            ConfidentialityOption::HomeroomTeacher => "담임 선생님",
            ConfidentialityOption::NoDisclosure => "알리고 싶지 않음",
        }
    }
}

/// People a student allows to be told about the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DisclosureTarget {
    Guardian,
    HomeroomTeacher,
}

impl From<DisclosureTarget> for ConfidentialityOption {
    fn from(target: DisclosureTarget) -> Self {
        match target {
            DisclosureTarget::Guardian => ConfidentialityOption::Guardian,
            DisclosureTarget::HomeroomTeacher => ConfidentialityOption::HomeroomTeacher,
        }
    }
}

/// A student's confidentiality choice.
///
/// Either a set of disclosure targets or the "no disclosure" sentinel, never
/// both. The target set may be empty while the form is being edited;
/// [`Confidentiality::normalized`] folds that into `NoDisclosure` on submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ConfidentialityOption>", into = "Vec<ConfidentialityOption>")]
pub enum Confidentiality {
    Disclose(BTreeSet<DisclosureTarget>),
    NoDisclosure,
}

impl Default for Confidentiality {
    fn default() -> Self {
        Confidentiality::Disclose(BTreeSet::new())
    }
}

impl Confidentiality {
    /// Apply a checkbox change.
    ///
    /// Checking "no disclosure" clears every target; checking a target drops
    /// "no disclosure". Unchecking "no disclosure" leaves nothing selected.
    pub fn toggle(&mut self, option: ConfidentialityOption, checked: bool) {
        let target = match option {
            ConfidentialityOption::Guardian => DisclosureTarget::Guardian,
            ConfidentialityOption::HomeroomTeacher => DisclosureTarget::HomeroomTeacher,
            ConfidentialityOption::NoDisclosure => {
                *self = if checked {
                    Confidentiality::NoDisclosure
                } else {
                    Confidentiality::default()
                };
                return;
            }
        };

        let mut targets = match std::mem::take(self) {
            Confidentiality::Disclose(targets) => targets,
            Confidentiality::NoDisclosure => BTreeSet::new(),
        };
        if checked {
            targets.insert(target);
        } else {
            targets.remove(&target);
        }
        *self = Confidentiality::Disclose(targets);
    }

    pub fn is_checked(&self, option: ConfidentialityOption) -> bool {
        self.options().contains(&option)
    }

    /// An empty selection means nobody may be told.
    pub fn normalized(self) -> Self {
        match self {
            Confidentiality::Disclose(targets) if targets.is_empty() => {
                Confidentiality::NoDisclosure
            }
            other => other,
        }
    }

    pub fn options(&self) -> Vec<ConfidentialityOption> {
        match self {
            Confidentiality::Disclose(targets) => targets.iter().map(|t| (*t).into()).collect(),
            Confidentiality::NoDisclosure => vec![ConfidentialityOption::NoDisclosure],
        }
    }
}

impl TryFrom<Vec<ConfidentialityOption>> for Confidentiality {
    type Error = String;

    fn try_from(options: Vec<ConfidentialityOption>) -> Result<Self, Self::Error> {
        let no_disclosure = options.contains(&ConfidentialityOption::NoDisclosure);
        let targets: BTreeSet<DisclosureTarget> = options
            .iter()
            .filter_map(|o| match o {
                ConfidentialityOption::Guardian => Some(DisclosureTarget::Guardian),
                ConfidentialityOption::HomeroomTeacher => Some(DisclosureTarget::HomeroomTeacher),
                ConfidentialityOption::NoDisclosure => None,
            })
            .collect();

        match (no_disclosure, targets.is_empty()) {
            (true, true) => Ok(Confidentiality::NoDisclosure),
            (true, false) => Err("\"알리고 싶지 않음\" cannot be combined with other options".into()),
            (false, _) => Ok(Confidentiality::Disclose(targets)),
        }
    }
}

impl From<Confidentiality> for Vec<ConfidentialityOption> {
    fn from(value: Confidentiality) -> Self {
        value.options()
    }
}

/// Preferred counseling time slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum PreferredTime {
    #[serde(rename = "점심시간")]
    Lunch,
    #[serde(rename = "방과후")]
    AfterSchool,
    #[serde(rename = "수업시간")]
    ClassTime,
}

impl PreferredTime {
    pub fn label(&self) -> &'static str {
        match self {
            PreferredTime::Lunch => "점심시간",
            PreferredTime::AfterSchool => "방과후",
            PreferredTime::ClassTime => "수업시간",
        }
    }
}

/// Student self-referral form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "validation", derive(validator::Validate))]
#[serde(rename_all = "camelCase")]
pub struct StudentForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub grade_class: String,
    #[serde(default)]
    pub reason: String,
    /// 1 (hard) to 5 (great).
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
    pub father_relation: Option<u8>,
    #[cfg_attr(
        feature = "validation",
        validate(range(min = 1, max = 5, message = "1에서 5 사이의 값이어야 합니다"))
    )]
    #[serde(default)]
    pub mother_relation: Option<u8>,
    #[serde(default)]
    pub self_perception: String,
    #[serde(default)]
    pub current_emotion: String,
    #[serde(default)]
    pub desired_change: String,
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<ConfidentialityOption>))]
    #[serde(default)]
    pub confidentiality: Confidentiality,
    /// Preferred date as entered (`YYYY-MM-DD`).
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: Option<PreferredTime>,
}

impl RequiredFields for StudentForm {
    fn missing_fields(&self) -> Vec<&'static str> {
        blank_labels(&[
            ("이름", &self.name),
            ("학년/반", &self.grade_class),
            ("상담 신청 이유", &self.reason),
        ])
    }
}
