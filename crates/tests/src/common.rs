use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::LazyLock;
use tower::ServiceExt;
use uuid::Uuid;

use server::db::AppState;
use server::openapi::build_router;
use server::storage::RecordStore;

pub const ADMIN_EMAIL: &str = "counselor@school.kr";
pub const ADMIN_PASSWORD: &str = "wee-class-2024";

/// Argon2 is slow in debug builds; hash the test password once.
static ADMIN_HASH: LazyLock<String> = LazyLock::new(|| {
    server::auth::password::hash_password(ADMIN_PASSWORD).expect("Failed to hash test password")
});

pub struct TestApp {
    pub router: Router,
    pub store: RecordStore,
}

/// Router over a fresh in-memory store with one administrator.
pub async fn test_app() -> TestApp {
    app_with(RecordStore::in_memory()).await
}

/// Router in demo mode: seeded sample data, writes refused.
pub async fn demo_app() -> TestApp {
    app_with(RecordStore::demo()).await
}

async fn app_with(store: RecordStore) -> TestApp {
    store
        .upsert_admin(ADMIN_EMAIL, &ADMIN_HASH)
        .await
        .expect("Failed to seed administrator");
    let router = build_router(AppState::new(store.clone()));
    TestApp { router, store }
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<&Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send a request and return status, headers, and raw body.
pub async fn send_raw(app: &Router, req: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, bytes.to_vec())
}

/// Send a request and parse the body as JSON (`Null` when empty).
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let (status, _, bytes) = send_raw(app, req).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, request("GET", uri, token, None)).await
}

pub async fn delete(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, request("DELETE", uri, token, None)).await
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    body: &Value,
    token: Option<&str>,
) -> (StatusCode, Value) {
    send(app, request("POST", uri, token, Some(body))).await
}

pub async fn put_json(
    app: &Router,
    uri: &str,
    body: &Value,
    token: Option<&str>,
) -> (StatusCode, Value) {
    send(app, request("PUT", uri, token, Some(body))).await
}

pub async fn patch_json(
    app: &Router,
    uri: &str,
    body: &Value,
    token: Option<&str>,
) -> (StatusCode, Value) {
    send(app, request("PATCH", uri, token, Some(body))).await
}

/// GET returning headers and raw bytes, for downloads.
pub async fn get_raw(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, HeaderMap, Vec<u8>) {
    send_raw(app, request("GET", uri, token, None)).await
}

/// POST returning headers too, for cookie checks.
pub async fn post_raw(
    app: &Router,
    uri: &str,
    body: &Value,
    headers: &[(&str, &str)],
) -> (StatusCode, HeaderMap, Vec<u8>) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    send_raw(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

/// GET with arbitrary headers (cookies, forwarded-for).
pub async fn get_with_headers(
    app: &Router,
    uri: &str,
    headers: &[(&str, &str)],
) -> (StatusCode, HeaderMap, Vec<u8>) {
    let mut builder = Request::builder().method("GET").uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    send_raw(app, builder.body(Body::empty()).unwrap()).await
}

/// Sign in as the seeded administrator and return the access token.
pub async fn login(app: &Router) -> String {
    let (status, body) = post_json(
        app,
        "/api/auth/login",
        &json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["access_token"].as_str().unwrap().to_string()
}

/// Value of cookie `name` from the `Set-Cookie` headers, if any.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.to_string())
}

pub fn student_form(name: &str) -> Value {
    json!({
        "name": name,
        "gradeClass": "3학년 2반",
        "reason": "친구들과의 관계가 어려워요",
        "peerRelation": 2,
        "confidentiality": ["담임 선생님"],
        "time": "점심시간"
    })
}

pub fn parent_form(child: &str) -> Value {
    json!({
        "childName": child,
        "gradeClass": "2학년 1반",
        "relation": "엄마",
        "contact": "010-1234-5678",
        "worries": "아이가 학교 가기를 싫어해요",
        "desiredChange": "즐겁게 등교했으면 좋겠어요",
        "motherRelationScore": 8
    })
}

pub fn teacher_form(code: &str, student: &str) -> Value {
    json!({
        "accessCode": code,
        "studentName": student,
        "gradeClass": "5학년 3반",
        "referralReason": "수업 시간에 자주 다툼이 있습니다",
        "desiredChange": "친구들과 원만하게 지내기",
        "peerRelation": 2,
        "inattention": "mild",
        "emotions": ["불안"]
    })
}

/// Submit a student form and return the new record id.
pub async fn submit_student(app: &Router, name: &str) -> Uuid {
    let (status, body) = post_json(app, "/api/forms/student", &student_form(name), None).await;
    assert_eq!(status, StatusCode::CREATED, "submit failed: {body}");
    body["id"].as_str().unwrap().parse().unwrap()
}
