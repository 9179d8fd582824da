use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{self, ADMIN_EMAIL, ADMIN_PASSWORD};

#[tokio::test]
async fn test_login_sets_cookies_and_returns_token() {
    let app = common::test_app().await;
    let (status, headers, body) = common::post_raw(
        &app.router,
        "/api/auth/login",
        &json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
        &[],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(common::cookie_value(&headers, "intake_access").is_some());
    assert!(common::cookie_value(&headers, "intake_refresh").is_some());

    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["admin"]["email"], ADMIN_EMAIL);
    assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
async fn test_wrong_password_is_rejected_with_message() {
    let app = common::test_app().await;
    let (status, body) = common::post_json(
        &app.router,
        "/api/auth/login",
        &json!({ "email": ADMIN_EMAIL, "password": "nope" }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "이메일 또는 비밀번호가 일치하지 않습니다.");
}

#[tokio::test]
async fn test_unknown_email_gets_same_message() {
    let app = common::test_app().await;
    let (status, body) = common::post_json(
        &app.router,
        "/api/auth/login",
        &json!({ "email": "someone@else.kr", "password": ADMIN_PASSWORD }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "이메일 또는 비밀번호가 일치하지 않습니다.");
}

#[tokio::test]
async fn test_session_reports_current_admin() {
    let app = common::test_app().await;
    let (status, _) = common::get(&app.router, "/api/auth/session", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = common::login(&app.router).await;
    let (status, body) = common::get(&app.router, "/api/auth/session", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], ADMIN_EMAIL);
}

#[tokio::test]
async fn test_access_cookie_authenticates() {
    let app = common::test_app().await;
    let token = common::login(&app.router).await;
    let cookie = format!("intake_access={token}");
    let (status, _, _) =
        common::get_with_headers(&app.router, "/api/auth/session", &[("cookie", &cookie)]).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_cookie_alone_rotates_session() {
    let app = common::test_app().await;
    let (_, headers, _) = common::post_raw(
        &app.router,
        "/api/auth/login",
        &json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
        &[],
    )
    .await;
    let refresh = common::cookie_value(&headers, "intake_refresh").unwrap();
    let cookie = format!("intake_refresh={refresh}");

    let (status, headers, _) =
        common::get_with_headers(&app.router, "/api/auth/session", &[("cookie", &cookie)]).await;
    assert_eq!(status, StatusCode::OK);
    let rotated = common::cookie_value(&headers, "intake_refresh").unwrap();
    assert_ne!(rotated, refresh);

    // The old refresh token was consumed.
    let (status, _, _) =
        common::get_with_headers(&app.router, "/api/auth/session", &[("cookie", &cookie)]).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_refresh_and_clears_cookies() {
    let app = common::test_app().await;
    let (_, headers, body) = common::post_raw(
        &app.router,
        "/api/auth/login",
        &json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
        &[],
    )
    .await;
    let refresh = common::cookie_value(&headers, "intake_refresh").unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let bearer = format!("Bearer {}", body["access_token"].as_str().unwrap());

    let (status, headers, _) = common::post_raw(
        &app.router,
        "/api/auth/logout",
        &json!({}),
        &[("authorization", &bearer)],
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(common::cookie_value(&headers, "intake_access").as_deref(), Some(""));

    let cookie = format!("intake_refresh={refresh}");
    let (status, _, _) =
        common::get_with_headers(&app.router, "/api/auth/session", &[("cookie", &cookie)]).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_without_session_still_succeeds() {
    let app = common::test_app().await;
    let (status, _) = common::post_json(&app.router, "/api/auth/logout", &json!({}), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_login_attempts_are_rate_limited() {
    let app = common::test_app().await;
    let wrong = json!({ "email": ADMIN_EMAIL, "password": "guess" });
    for _ in 0..10 {
        let (status, _) = common::post_json(&app.router, "/api/auth/login", &wrong, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    let (status, body) = common::post_json(&app.router, "/api/auth/login", &wrong, None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        body["message"],
        "로그인 시도가 너무 많습니다. 잠시 후 다시 시도해주세요."
    );
}

#[tokio::test]
async fn test_tampered_token_is_unauthorized() {
    let app = common::test_app().await;
    let token = common::login(&app.router).await;
    let tampered = format!("{token}x");
    let (status, _) = common::get(&app.router, "/api/admin/student/records", Some(&tampered)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
