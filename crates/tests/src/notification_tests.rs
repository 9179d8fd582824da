use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use crate::common;

/// Local webhook endpoint that forwards every payload it receives.
async fn webhook_receiver(reply: StatusCode) -> (String, mpsc::UnboundedReceiver<Value>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let router = Router::new()
        .route(
            "/hook",
            post(
                |State((tx, reply)): State<(mpsc::UnboundedSender<Value>, StatusCode)>,
                 Json(payload): Json<Value>| async move {
                    let _ = tx.send(payload);
                    reply
                },
            ),
        )
        .with_state((tx, reply));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://{addr}/hook"), rx)
}

async fn enable_webhook(app: &common::TestApp, token: &str, url: &str) {
    let (status, _) = common::put_json(
        &app.router,
        "/api/admin/settings/notifications",
        &json!({ "webhookUrl": url, "isEnabled": true }),
        Some(token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_submission_posts_embed_to_webhook() {
    let app = common::test_app().await;
    let token = common::login(&app.router).await;
    let (url, mut rx) = webhook_receiver(StatusCode::NO_CONTENT).await;
    enable_webhook(&app, &token, &url).await;

    common::submit_student(&app.router, "김철수").await;

    let payload = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("webhook was not called")
        .unwrap();
    let embed = &payload["embeds"][0];
    assert_eq!(embed["title"], "😊 학생 상담 신청이 도착했습니다!");
    assert_eq!(embed["color"], 3447003);
    assert!(embed["description"]
        .as_str()
        .unwrap()
        .contains("**이름:** 김철수"));
    assert!(embed["timestamp"].is_string());
}

#[tokio::test]
async fn test_parent_alert_uses_parent_color() {
    let app = common::test_app().await;
    let token = common::login(&app.router).await;
    let (url, mut rx) = webhook_receiver(StatusCode::OK).await;
    enable_webhook(&app, &token, &url).await;

    common::post_json(&app.router, "/api/forms/parent", &common::parent_form("이영희"), None).await;

    let payload = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("webhook was not called")
        .unwrap();
    assert_eq!(payload["embeds"][0]["color"], 15844367);
    assert!(payload["embeds"][0]["description"]
        .as_str()
        .unwrap()
        .contains("**신청자:** 엄마"));
}

#[tokio::test]
async fn test_disabled_notifications_send_nothing() {
    let app = common::test_app().await;
    let token = common::login(&app.router).await;
    let (url, mut rx) = webhook_receiver(StatusCode::OK).await;
    common::put_json(
        &app.router,
        "/api/admin/settings/notifications",
        &json!({ "webhookUrl": url, "isEnabled": false }),
        Some(&token),
    )
    .await;

    common::submit_student(&app.router, "김철수").await;
    let received = tokio::time::timeout(Duration::from_millis(300), rx.recv()).await;
    assert!(received.is_err(), "disabled webhook was called");
}

#[tokio::test]
async fn test_failing_webhook_does_not_fail_submission() {
    let app = common::test_app().await;
    let token = common::login(&app.router).await;
    let (url, mut rx) = webhook_receiver(StatusCode::INTERNAL_SERVER_ERROR).await;
    enable_webhook(&app, &token, &url).await;

    let (status, _) = common::post_json(
        &app.router,
        "/api/forms/student",
        &common::student_form("김철수"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    // The alert was attempted even though it failed.
    assert!(tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .is_ok());
}

#[tokio::test]
async fn test_unreachable_webhook_does_not_fail_submission() {
    let app = common::test_app().await;
    let token = common::login(&app.router).await;
    enable_webhook(&app, &token, "http://127.0.0.1:9/hook").await;

    let (status, _) = common::post_json(
        &app.router,
        "/api/forms/student",
        &common::student_form("김철수"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_test_notification_reports_outcome() {
    let app = common::test_app().await;
    let token = common::login(&app.router).await;
    let (url, mut rx) = webhook_receiver(StatusCode::NO_CONTENT).await;

    let (status, body) = common::post_json(
        &app.router,
        "/api/admin/settings/notifications/test",
        &json!({ "webhookUrl": url, "isEnabled": false }),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "테스트 알림을 보냈습니다.");
    let payload = rx.recv().await.unwrap();
    assert_eq!(payload["embeds"][0]["title"], "🔔 테스트 알림");

    let (status, body) = common::post_json(
        &app.router,
        "/api/admin/settings/notifications/test",
        &json!({ "webhookUrl": "http://127.0.0.1:9/hook", "isEnabled": true }),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("테스트 알림 전송에 실패했습니다"));
}
