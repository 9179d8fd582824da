use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use crate::common;

#[tokio::test]
async fn test_export_downloads_pdf_named_after_subject() {
    let app = common::test_app().await;
    let token = common::login(&app.router).await;
    let id = common::submit_student(&app.router, "김철수").await;

    let (status, headers, bytes) = common::get_raw(
        &app.router,
        &format!("/api/admin/student/records/{id}/export"),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["content-type"], "application/pdf");
    let disposition = headers["content-disposition"].to_str().unwrap();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains(&format!(
        "filename*=UTF-8''{}",
        urlencode("김철수_학생_상담_신청서.pdf")
    )));
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_export_preview_lists_labels_in_order() {
    let app = common::test_app().await;
    let token = common::login(&app.router).await;
    let id = common::submit_student(&app.router, "김철수").await;

    let (status, doc) = common::get(
        &app.router,
        &format!("/api/admin/student/records/{id}/export/preview"),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["title"], "김철수 - 학생 상담 신청서");

    let labels: Vec<&str> = doc["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["label"].as_str().unwrap())
        .collect();
    // Blank fields (self perception, date, ...) are left out.
    assert_eq!(
        labels,
        vec![
            "이름",
            "학년 / 반",
            "상담 신청 이유",
            "친구 관계",
            "상담 사실을 알려도 되는 사람",
            "희망 시간",
        ]
    );
    assert_eq!(doc["entries"][3]["value"], "별로예요");
    assert_eq!(doc["entries"][4]["value"], "담임 선생님");
}

#[tokio::test]
async fn test_export_missing_record_is_404() {
    let app = common::test_app().await;
    let token = common::login(&app.router).await;
    let (status, _, _) = common::get_raw(
        &app.router,
        &format!("/api/admin/student/records/{}/export", uuid::Uuid::new_v4()),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_export_requires_login() {
    let app = common::test_app().await;
    let id = common::submit_student(&app.router, "김철수").await;
    let (status, _, _) = common::get_raw(
        &app.router,
        &format!("/api/admin/student/records/{id}/export"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

/// Percent-encode everything outside the unreserved set, as the header does.
fn urlencode(text: &str) -> String {
    text.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect()
}
