use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common;

#[tokio::test]
async fn test_admin_routes_require_login() {
    let app = common::test_app().await;
    let (status, body) = common::get(&app.router, "/api/admin/student/records", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "로그인이 필요합니다.");
}

#[tokio::test]
async fn test_list_is_newest_first_per_role() {
    let app = common::test_app().await;
    let token = common::login(&app.router).await;
    for name in ["첫째", "둘째", "셋째"] {
        common::submit_student(&app.router, name).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    common::post_json(&app.router, "/api/forms/parent", &common::parent_form("이영희"), None).await;

    let (status, body) =
        common::get(&app.router, "/api/admin/student/records", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["limit"], 50);
    let names: Vec<&str> = body["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["셋째", "둘째", "첫째"]);

    let (_, parents) = common::get(&app.router, "/api/admin/parent/records", Some(&token)).await;
    assert_eq!(parents["records"].as_array().unwrap().len(), 1);
    assert_eq!(parents["records"][0]["role"], "parent");
}

#[tokio::test]
async fn test_list_caps_at_fifty() {
    let app = common::test_app().await;
    let token = common::login(&app.router).await;
    for i in 0..55 {
        common::submit_student(&app.router, &format!("학생{i}")).await;
    }
    let (_, body) = common::get(&app.router, "/api/admin/student/records", Some(&token)).await;
    assert_eq!(body["records"].as_array().unwrap().len(), 50);
}

#[tokio::test]
async fn test_unknown_role_is_bad_request() {
    let app = common::test_app().await;
    let token = common::login(&app.router).await;
    let (status, _) = common::get(&app.router, "/api/admin/principal/records", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_review_scenario_status_toggle() {
    let app = common::test_app().await;
    let token = common::login(&app.router).await;
    let id = common::submit_student(&app.router, "김철수").await;
    let uri = format!("/api/admin/student/records/{id}");

    let (status, record) = common::get(&app.router, &uri, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["name"], "김철수");
    assert_eq!(record["status"], "접수대기");

    let (status, updated) = common::patch_json(
        &app.router,
        &format!("{uri}/status"),
        &json!({ "status": "상담완료" }),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "상담완료");
    assert_eq!(updated["reason"], record["reason"]);
    assert_eq!(updated["createdAt"], record["createdAt"]);

    let (_, back) = common::patch_json(
        &app.router,
        &format!("{uri}/status"),
        &json!({ "status": "접수대기" }),
        Some(&token),
    )
    .await;
    assert_eq!(back["status"], "접수대기");
}

#[tokio::test]
async fn test_status_outside_two_values_rejected() {
    let app = common::test_app().await;
    let token = common::login(&app.router).await;
    let id = common::submit_student(&app.router, "김철수").await;
    let (status, _) = common::patch_json(
        &app.router,
        &format!("/api/admin/student/records/{id}/status"),
        &json!({ "status": "진행중" }),
        Some(&token),
    )
    .await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_record_lookup_is_scoped_to_role() {
    let app = common::test_app().await;
    let token = common::login(&app.router).await;
    let id = common::submit_student(&app.router, "김철수").await;
    let (status, _) = common::get(
        &app.router,
        &format!("/api/admin/parent/records/{id}"),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_then_get_returns_404() {
    let app = common::test_app().await;
    let token = common::login(&app.router).await;
    let id = common::submit_student(&app.router, "김철수").await;
    let uri = format!("/api/admin/student/records/{id}");

    let (status, _) = common::delete(&app.router, &uri, Some(&token)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = common::get(&app.router, &uri, Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = common::delete(&app.router, &uri, Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "이미 삭제되었거나 존재하지 않는 항목입니다.");
}

#[tokio::test]
async fn test_invalid_uuid_is_bad_request() {
    let app = common::test_app().await;
    let token = common::login(&app.router).await;
    let (status, _) =
        common::get(&app.router, "/api/admin/student/records/not-a-uuid", Some(&token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
