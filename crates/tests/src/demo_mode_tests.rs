use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use shared_types::Role;

use crate::common;

#[tokio::test]
async fn test_demo_refuses_public_submissions() {
    let app = common::demo_app().await;
    let (status, body) = common::post_json(
        &app.router,
        "/api/forms/student",
        &common::student_form("김철수"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "데모 모드에서는 신청서를 제출할 수 없습니다.");
}

#[tokio::test]
async fn test_demo_serves_sample_records() {
    let app = common::demo_app().await;
    let token = common::login(&app.router).await;
    for role in Role::ALL {
        let (status, body) = common::get(
            &app.router,
            &format!("/api/admin/{role}/records"),
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body["records"].as_array().unwrap().is_empty(), "{role} is empty");
    }
}

#[tokio::test]
async fn test_demo_admin_changes_stay_in_memory() {
    let app = common::demo_app().await;
    let token = common::login(&app.router).await;
    let records = app.store.list_recent(Role::Student, 50).await.unwrap();
    let id = records[0].id;

    let (status, _) = common::patch_json(
        &app.router,
        &format!("/api/admin/student/records/{id}/status"),
        &json!({ "status": "상담완료" }),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = common::delete(
        &app.router,
        &format!("/api/admin/student/records/{id}"),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(
        app.store.list_recent(Role::Student, 50).await.unwrap().len(),
        records.len() - 1
    );
}

#[tokio::test]
async fn test_demo_hides_settings() {
    let app = common::demo_app().await;
    let token = common::login(&app.router).await;
    let (status, _) =
        common::get(&app.router, "/api/admin/settings/notifications", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = common::put_json(
        &app.router,
        "/api/admin/settings/teacher-access",
        &json!({ "password": "1111" }),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
