//! Sample data served when no database is configured.

use chrono::{Duration, Utc};
use shared_types::{
    ConfidentialityOption, Confidentiality, Emotion, ParentForm, ParentRelation, PreferredTime,
    Record, RecordBody, Severity, Status, StudentForm, TeacherForm,
};
use uuid::Uuid;

/// Email of the administrator provisioned in demo mode when none is configured.
pub const DEMO_ADMIN_EMAIL: &str = "admin@demo.local";
/// Password of that administrator. Demo data only lives in memory.
pub const DEMO_ADMIN_PASSWORD: &str = "demo1234";

pub fn sample_records() -> Vec<Record> {
    let now = Utc::now();

    let mut homeroom_only = Confidentiality::default();
    homeroom_only.toggle(ConfidentialityOption::HomeroomTeacher, true);

    vec![
        Record {
            id: Uuid::new_v4(),
            status: Status::Awaiting,
            created_at: Some(now - Duration::hours(2)),
            body: RecordBody::Student(StudentForm {
                name: "김철수".into(),
                grade_class: "3학년 2반".into(),
                reason: "친구들과의 관계가 어려워요".into(),
                peer_relation: Some(2),
                father_relation: Some(4),
                mother_relation: Some(5),
                current_emotion: "요즘 자주 외로워요".into(),
                desired_change: "친구들과 잘 지내고 싶어요".into(),
                confidentiality: homeroom_only,
                time: Some(PreferredTime::Lunch),
                ..Default::default()
            }),
        },
        Record {
            id: Uuid::new_v4(),
            status: Status::Completed,
            created_at: Some(now - Duration::days(1)),
            body: RecordBody::Student(StudentForm {
                name: "이영희".into(),
                grade_class: "2학년 1반".into(),
                reason: "시험 스트레스".into(),
                peer_relation: Some(4),
                confidentiality: Confidentiality::NoDisclosure,
                time: Some(PreferredTime::AfterSchool),
                ..Default::default()
            }),
        },
        Record {
            id: Uuid::new_v4(),
            status: Status::Awaiting,
            created_at: Some(now - Duration::hours(5)),
            body: RecordBody::Parent(ParentForm {
                child_name: "박민수".into(),
                grade_class: "4학년 3반".into(),
                relation: Some(ParentRelation::Mother),
                contact: "010-1234-5678".into(),
                desired_time: "평일 오후 4시 이후".into(),
                worries: "아침마다 등교를 거부합니다".into(),
                desired_change: "학교생활에 다시 흥미를 갖기를 바랍니다".into(),
                medical_history: Some(false),
                mother_relation_score: Some(7),
                father_relation_score: Some(6),
                ..Default::default()
            }),
        },
        Record {
            id: Uuid::new_v4(),
            status: Status::Awaiting,
            created_at: Some(now - Duration::days(2)),
            body: RecordBody::Teacher(TeacherForm {
                student_name: "최동욱".into(),
                grade_class: "5학년 1반".into(),
                referral_reason: "수업 중 잦은 충돌".into(),
                desired_change: "감정 조절 방법을 익히기를 바랍니다".into(),
                class_attitude: Some(2),
                compliance: Some(2),
                impulsivity: Some(Severity::Severe),
                aggression: Some(Severity::Moderate),
                emotions: [Emotion::Anger, Emotion::Irritability].into_iter().collect(),
                repetitive_behavior: Some(false),
                ..Default::default()
            }),
        },
    ]
}
