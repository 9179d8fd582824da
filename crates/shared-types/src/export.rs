//! Printable rendering of a single record.
//!
//! Fields appear in a fixed per-role order as `label → value`. Coded values
//! (scales, severities, flags) are mapped through role-specific label tables
//! and blank or absent fields are left out entirely.

use chrono::{DateTime, Datelike, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::{ParentForm, Record, RecordBody, StudentForm, TeacherForm};

/// Header date shown when a record has no creation timestamp.
pub const MISSING_DATE: &str = "날짜 없음";

/// Dates are printed in the school's local time (UTC+9).
const LOCAL_OFFSET_SECS: i32 = 9 * 3600;

const STUDENT_SCALE: [&str; 5] = ["힘들어요", "별로예요", "그저 그래요", "좋아요", "정말 좋아요"];
const TEACHER_SCALE: [&str; 5] = ["매우 나쁨", "나쁨", "보통", "좋음", "매우 좋음"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ExportEntry {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ExportDocument {
    pub subject: String,
    pub form_label: String,
    /// `"{subject} - {form label}"`.
    pub title: String,
    /// Right-aligned header date.
    pub date: String,
    pub entries: Vec<ExportEntry>,
}

impl ExportDocument {
    pub fn from_record(record: &Record) -> Self {
        let subject = record.subject_name().trim().to_string();
        let form_label = record.role().form_label().to_string();
        let entries = match &record.body {
            RecordBody::Student(form) => student_entries(form),
            RecordBody::Parent(form) => parent_entries(form),
            RecordBody::Teacher(form) => teacher_entries(form),
        };

        Self {
            title: format!("{subject} - {form_label}"),
            date: format_date(record.created_at),
            subject,
            form_label,
            entries,
        }
    }

    /// Download filename, `"{subject}_{form label}.{extension}"`.
    pub fn filename(&self, extension: &str) -> String {
        let stem: String = format!("{}_{}", self.subject, self.form_label)
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_whitespace() => '_',
                c => c,
            })
            .collect();
        format!("{stem}.{extension}")
    }

    pub fn value_of(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.value.as_str())
    }
}

/// `YYYY. M. D.` in local time, or the placeholder when absent.
pub fn format_date(created_at: Option<DateTime<Utc>>) -> String {
    let offset = FixedOffset::east_opt(LOCAL_OFFSET_SECS);
    match (created_at, offset) {
        (Some(ts), Some(offset)) => {
            let local = ts.with_timezone(&offset);
            format!("{}. {}. {}.", local.year(), local.month(), local.day())
        }
        (Some(ts), None) => format!("{}. {}. {}.", ts.year(), ts.month(), ts.day()),
        (None, _) => MISSING_DATE.to_string(),
    }
}

pub fn student_scale_label(value: u8) -> Option<&'static str> {
    scale_label(&STUDENT_SCALE, value)
}

pub fn teacher_scale_label(value: u8) -> Option<&'static str> {
    scale_label(&TEACHER_SCALE, value)
}

fn scale_label(table: &[&'static str; 5], value: u8) -> Option<&'static str> {
    (1..=5)
        .contains(&value)
        .then(|| table[usize::from(value) - 1])
}

/// Ordered entry builder that drops blank values.
#[derive(Default)]
struct Entries(Vec<ExportEntry>);

impl Entries {
    fn text(mut self, label: &str, value: &str) -> Self {
        let value = value.trim();
        if !value.is_empty() {
            self.0.push(ExportEntry {
                label: label.to_string(),
                value: value.to_string(),
            });
        }
        self
    }

    fn opt(self, label: &str, value: Option<String>) -> Self {
        match value {
            Some(v) => self.text(label, &v),
            None => self,
        }
    }

    fn finish(self) -> Vec<ExportEntry> {
        self.0
    }
}

fn yes_no(value: Option<bool>, yes: &str, no: &str) -> Option<String> {
    value.map(|v| if v { yes } else { no }.to_string())
}

fn student_scale(value: Option<u8>) -> Option<String> {
    value.map(|v| {
        student_scale_label(v)
            .map(str::to_string)
            .unwrap_or_else(|| v.to_string())
    })
}

fn teacher_scale(value: Option<u8>) -> Option<String> {
    value.map(|v| {
        teacher_scale_label(v)
            .map(str::to_string)
            .unwrap_or_else(|| v.to_string())
    })
}

fn student_entries(form: &StudentForm) -> Vec<ExportEntry> {
    let confidentiality = form
        .confidentiality
        .options()
        .iter()
        .map(|o| o.label())
        .collect::<Vec<_>>()
        .join(", ");

    Entries::default()
        .text("이름", &form.name)
        .text("학년 / 반", &form.grade_class)
        .text("상담 신청 이유", &form.reason)
        .opt("친구 관계", student_scale(form.peer_relation))
        .opt("아빠와의 관계", student_scale(form.father_relation))
        .opt("엄마와의 관계", student_scale(form.mother_relation))
        .text("나 자신에 대한 생각", &form.self_perception)
        .text("요즘 나의 감정", &form.current_emotion)
        .text("변화되고 싶은 점", &form.desired_change)
        .text("상담 사실을 알려도 되는 사람", &confidentiality)
        .text("희망 날짜", &form.date)
        .opt("희망 시간", form.time.map(|t| t.label().to_string()))
        .finish()
}

fn parent_entries(form: &ParentForm) -> Vec<ExportEntry> {
    Entries::default()
        .text("자녀 이름", &form.child_name)
        .text("학년 / 반", &form.grade_class)
        .opt("학생과의 관계", form.relation.map(|r| r.label().to_string()))
        .text("연락처", &form.contact)
        .text("상담 희망 시간", &form.desired_time)
        .text("아이에 대해서 걱정되는 것", &form.worries)
        .text("학생의 모습에 대한 실제 사례", &form.examples)
        .text("문제의 시작 시점과 원인", &form.onset_and_cause)
        .text("지금까지 시도해 본 해결 방법과 그 효과", &form.attempts_and_effects)
        .text("상담을 통해 기대하는 변화", &form.desired_change)
        .text("학생의 강점", &form.strengths)
        .text("학생이 좋아하는 활동", &form.favorite_activities)
        .opt(
            "병원 진료 또는 상담 경험 유무",
            yes_no(form.medical_history, "예", "아니오"),
        )
        .text("진료 또는 상담 내용", &form.medical_history_detail)
        .opt(
            "엄마와의 관계 점수",
            form.mother_relation_score.map(|s| format!("{s}점")),
        )
        .opt(
            "아빠와의 관계 점수",
            form.father_relation_score.map(|s| format!("{s}점")),
        )
        .text("아동의 기질적 특성", &form.temperament)
        .text("예외적 상황 (긍정적 자원)", &form.exceptional_situations)
        .text("참고", &form.note)
        .finish()
}

fn teacher_entries(form: &TeacherForm) -> Vec<ExportEntry> {
    let emotions = form
        .emotions
        .iter()
        .map(|e| e.label())
        .collect::<Vec<_>>()
        .join(", ");

    Entries::default()
        .text("학생 이름", &form.student_name)
        .text("학년 / 반", &form.grade_class)
        .text("의뢰 사유", &form.referral_reason)
        .text("상담을 통해 기대하는 변화", &form.desired_change)
        .text("학생의 강점", &form.strengths)
        .text("학생이 좋아하는 활동", &form.favorite_activities)
        .opt("친구 관계", teacher_scale(form.peer_relation))
        .opt("수업 태도", teacher_scale(form.class_attitude))
        .opt("학습 능력", teacher_scale(form.learning_ability))
        .opt("교사 지시 순응도", teacher_scale(form.compliance))
        .opt("부주의함", form.inattention.map(|s| s.label().to_string()))
        .opt("충동성", form.impulsivity.map(|s| s.label().to_string()))
        .opt("공격성", form.aggression.map(|s| s.label().to_string()))
        .text("학생의 모습에 대한 실제 사례", &form.behavioral_examples)
        .text("정서 상태 (주된 정서)", &emotions)
        .text("기타 정서 내용", &form.other_emotion_detail)
        .opt(
            "교실에서 눈에 띄는 반복 행동이 있나요?",
            yes_no(form.repetitive_behavior, "있음", "없음"),
        )
        .text("반복 행동 내용", &form.repetitive_behavior_detail)
        .text("문제 상황의 빈도", &form.frequency)
        .text("문제 상황의 심각성", &form.severity)
        .finish()
}
