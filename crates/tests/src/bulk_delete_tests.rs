use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use shared_types::Role;
use uuid::Uuid;

use crate::common;

#[tokio::test]
async fn test_bulk_delete_removes_selected() {
    let app = common::test_app().await;
    let token = common::login(&app.router).await;
    let a = common::submit_student(&app.router, "가").await;
    let b = common::submit_student(&app.router, "나").await;
    let keep = common::submit_student(&app.router, "다").await;

    let (status, body) = common::post_json(
        &app.router,
        "/api/admin/student/records/bulk-delete",
        &json!({ "ids": [a, b] }),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"].as_array().unwrap().len(), 2);
    assert!(body["failed"].as_array().unwrap().is_empty());

    let left = app.store.list_recent(Role::Student, 50).await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].id, keep);
}

#[tokio::test]
async fn test_bulk_delete_reports_missing_ids_without_rollback() {
    let app = common::test_app().await;
    let token = common::login(&app.router).await;
    let real = common::submit_student(&app.router, "가").await;
    let ghost = Uuid::new_v4();

    let (status, body) = common::post_json(
        &app.router,
        "/api/admin/student/records/bulk-delete",
        &json!({ "ids": [real, ghost] }),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], json!([real]));
    assert_eq!(body["failed"][0]["id"], json!(ghost));
    assert!(app.store.find(Role::Student, real).await.unwrap().is_none());
}

#[tokio::test]
async fn test_bulk_delete_empty_selection_rejected() {
    let app = common::test_app().await;
    let token = common::login(&app.router).await;
    let (status, _) = common::post_json(
        &app.router,
        "/api/admin/student/records/bulk-delete",
        &json!({ "ids": [] }),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_bulk_delete_requires_login() {
    let app = common::test_app().await;
    let id = common::submit_student(&app.router, "가").await;
    let (status, _) = common::post_json(
        &app.router,
        "/api/admin/student/records/bulk-delete",
        &json!({ "ids": [id] }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(app.store.find(Role::Student, id).await.unwrap().is_some());
}
