use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common;

#[tokio::test]
async fn test_notifications_default_to_disabled() {
    let app = common::test_app().await;
    let token = common::login(&app.router).await;
    let (status, body) =
        common::get(&app.router, "/api/admin/settings/notifications", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "webhookUrl": "", "isEnabled": false }));
}

#[tokio::test]
async fn test_notification_settings_round_trip_trimmed() {
    let app = common::test_app().await;
    let token = common::login(&app.router).await;
    let (status, saved) = common::put_json(
        &app.router,
        "/api/admin/settings/notifications",
        &json!({ "webhookUrl": "  https://discord.com/api/webhooks/1/abc  ", "isEnabled": true }),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["webhookUrl"], "https://discord.com/api/webhooks/1/abc");

    let (_, body) =
        common::get(&app.router, "/api/admin/settings/notifications", Some(&token)).await;
    assert_eq!(body, saved);
}

#[tokio::test]
async fn test_enabling_without_url_rejected() {
    let app = common::test_app().await;
    let token = common::login(&app.router).await;
    let (status, body) = common::put_json(
        &app.router,
        "/api/admin/settings/notifications",
        &json!({ "webhookUrl": " ", "isEnabled": true }),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["field_errors"]["웹훅 URL"].is_string());
}

#[tokio::test]
async fn test_teacher_code_change_takes_effect() {
    let app = common::test_app().await;
    let token = common::login(&app.router).await;

    let (status, body) =
        common::get(&app.router, "/api/admin/settings/teacher-access", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["password"], "2580");

    let (status, _) = common::put_json(
        &app.router,
        "/api/admin/settings/teacher-access",
        &json!({ "password": "7777" }),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (old, _) = common::post_json(
        &app.router,
        "/api/forms/teacher/access",
        &json!({ "code": "2580" }),
        None,
    )
    .await;
    assert_eq!(old, StatusCode::FORBIDDEN);
    let (new, _) = common::post_json(
        &app.router,
        "/api/forms/teacher/access",
        &json!({ "code": "7777" }),
        None,
    )
    .await;
    assert_eq!(new, StatusCode::OK);
}

#[tokio::test]
async fn test_blank_teacher_code_rejected() {
    let app = common::test_app().await;
    let token = common::login(&app.router).await;
    for password in ["", "   "] {
        let (status, _) = common::put_json(
            &app.router,
            "/api/admin/settings/teacher-access",
            &json!({ "password": password }),
            Some(&token),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
    let (_, body) =
        common::get(&app.router, "/api/admin/settings/teacher-access", Some(&token)).await;
    assert_eq!(body["password"], "2580");
}

#[tokio::test]
async fn test_settings_require_login() {
    let app = common::test_app().await;
    let (status, _) = common::get(&app.router, "/api/admin/settings/teacher-access", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
