use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use shared_types::{ConfidentialityOption, RecordBody, Role, Status};

use crate::common;

#[tokio::test]
async fn test_student_submit_creates_awaiting_record() {
    let app = common::test_app().await;
    let id = common::submit_student(&app.router, "김철수").await;

    let record = app.store.find(Role::Student, id).await.unwrap().unwrap();
    assert_eq!(record.status, Status::Awaiting);
    assert!(record.created_at.is_some());
    assert_eq!(record.subject_name(), "김철수");
}

#[tokio::test]
async fn test_submit_response_carries_id_and_status() {
    let app = common::test_app().await;
    let (status, body) = common::post_json(
        &app.router,
        "/api/forms/parent",
        &common::parent_form("이영희"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "접수대기");
    assert!(body["createdAt"].is_string());
    assert!(body["id"].as_str().unwrap().parse::<uuid::Uuid>().is_ok());
}

#[tokio::test]
async fn test_missing_required_fields_lists_labels() {
    let app = common::test_app().await;
    let (status, body) = common::post_json(
        &app.router,
        "/api/forms/student",
        &json!({ "name": "  ", "gradeClass": "3-2" }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], "ValidationError");
    assert_eq!(body["message"], "다음 항목을 입력해주세요: 이름, 상담 신청 이유");
    assert!(body["field_errors"]["이름"].is_string());
    assert!(body["field_errors"]["상담 신청 이유"].is_string());

    let stored = app.store.list_recent(Role::Student, 50).await.unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_parent_missing_fields_in_form_order() {
    let app = common::test_app().await;
    let (status, body) =
        common::post_json(&app.router, "/api/forms/parent", &json!({}), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["message"],
        "다음 항목을 입력해주세요: 자녀 이름, 학년/반, 걱정되는 점, 기대하는 변화"
    );
}

#[tokio::test]
async fn test_out_of_range_scale_rejected() {
    let app = common::test_app().await;
    let mut form = common::student_form("김철수");
    form["peerRelation"] = json!(6);
    let (status, body) = common::post_json(&app.router, "/api/forms/student", &form, None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["field_errors"]["peer_relation"].is_string());
}

#[tokio::test]
async fn test_no_disclosure_with_other_target_rejected() {
    let app = common::test_app().await;
    let mut form = common::student_form("김철수");
    form["confidentiality"] = json!(["부모님", "알리고 싶지 않음"]);
    let (status, _) = common::post_json(&app.router, "/api/forms/student", &form, None).await;
    assert!(status.is_client_error());
    assert!(app
        .store
        .list_recent(Role::Student, 50)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_empty_confidentiality_stored_as_no_disclosure() {
    let app = common::test_app().await;
    let mut form = common::student_form("김철수");
    form["confidentiality"] = json!([]);
    let (status, body) = common::post_json(&app.router, "/api/forms/student", &form, None).await;
    assert_eq!(status, StatusCode::CREATED);

    let id = body["id"].as_str().unwrap().parse().unwrap();
    let record = app.store.find(Role::Student, id).await.unwrap().unwrap();
    match record.body {
        RecordBody::Student(form) => assert_eq!(
            form.confidentiality.options(),
            vec![ConfidentialityOption::NoDisclosure]
        ),
        other => panic!("unexpected body: {other:?}"),
    }
}

#[tokio::test]
async fn test_each_submit_creates_exactly_one_record() {
    let app = common::test_app().await;
    for name in ["가", "나", "다"] {
        common::submit_student(&app.router, name).await;
    }
    let stored = app.store.list_recent(Role::Student, 50).await.unwrap();
    assert_eq!(stored.len(), 3);
    assert!(app
        .store
        .list_recent(Role::Parent, 50)
        .await
        .unwrap()
        .is_empty());
}
