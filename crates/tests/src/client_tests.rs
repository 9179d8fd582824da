use app::client::INVALID_CREDENTIALS;
use app::{
    AdminWorkspace, ApiClient, AuthGate, FormCapture, FormOutcome, GateView, Screen,
    SessionState,
};
use pretty_assertions::assert_eq;
use shared_types::{NotificationConfig, Role, Status, DEFAULT_TEACHER_ACCESS_CODE};

use crate::common::{self, ADMIN_EMAIL, ADMIN_PASSWORD};

/// Serve the test app on a local port and return its base URL.
async fn serve(app: &common::TestApp) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = app.router.clone();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_sign_in_publishes_session() {
    let app = common::test_app().await;
    let client = ApiClient::connect(serve(&app).await).await.unwrap();
    let mut rx = client.subscribe();
    assert_eq!(AuthGate::decide(&rx.borrow()), GateView::RedirectToLogin);

    let err = client.sign_in(ADMIN_EMAIL, "wrong").await.unwrap_err();
    assert_eq!(err.message, INVALID_CREDENTIALS);
    assert_eq!(client.session(), SessionState::Anonymous);

    let admin = client.sign_in(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
    assert_eq!(admin.email, ADMIN_EMAIL);
    assert!(rx.has_changed().unwrap());
    assert_eq!(
        AuthGate::decide(&rx.borrow_and_update()),
        GateView::Granted(admin.clone())
    );

    assert_eq!(
        client.refresh_session().await,
        SessionState::Authenticated(admin)
    );

    client.sign_out().await;
    assert_eq!(AuthGate::decide(&rx.borrow()), GateView::RedirectToLogin);
}

#[tokio::test]
async fn test_forms_and_workspace_over_http() {
    let app = common::test_app().await;
    let base = serve(&app).await;

    // Public side.
    let mut forms = FormCapture::new(ApiClient::new(&base).unwrap());
    forms.open(Screen::Student);
    assert!(matches!(forms.submit_student().await, FormOutcome::Missing(_)));

    forms.student.name = "김철수".to_string();
    forms.student.grade_class = "3학년 2반".to_string();
    forms.student.reason = "친구 관계".to_string();
    let FormOutcome::Submitted { id } = forms.submit_student().await else {
        panic!("student form was not stored");
    };
    assert_eq!(forms.screen(), Screen::Landing);

    forms.open(Screen::Teacher);
    assert_eq!(forms.screen(), Screen::TeacherGate);
    assert!(forms.unlock_teacher("0000").await.is_err());
    forms.unlock_teacher(DEFAULT_TEACHER_ACCESS_CODE).await.unwrap();
    forms.teacher.student_name = "박민수".to_string();
    forms.teacher.grade_class = "5학년 3반".to_string();
    forms.teacher.referral_reason = "잦은 다툼".to_string();
    forms.teacher.desired_change = "원만한 관계".to_string();
    assert!(matches!(
        forms.submit_teacher().await,
        FormOutcome::Submitted { .. }
    ));

    // Admin side.
    let client = ApiClient::connect(&base).await.unwrap();
    let mut workspace = AdminWorkspace::new(client.clone());
    workspace.load_tab(Role::Student).await;
    assert!(workspace.is_empty());
    assert!(workspace.banner().unwrap().is_error());

    client.sign_in(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
    workspace.load_tab(Role::Student).await;
    assert_eq!(workspace.len(), 1);
    assert_eq!(workspace.rows()[0].id, id);

    assert_eq!(workspace.toggle_status(id).await.unwrap(), Status::Completed);
    let stored = app.store.find(Role::Student, id).await.unwrap().unwrap();
    assert_eq!(stored.status, Status::Completed);

    let file = workspace.export_one(id).await.unwrap();
    assert_eq!(file.filename, "김철수_학생_상담_신청서.pdf");
    assert!(file.bytes.starts_with(b"%PDF"));

    workspace.load_tab(Role::Teacher).await;
    assert_eq!(workspace.len(), 1);
    workspace.select_all(true);
    assert!(workspace.request_bulk_delete());
    let outcome = workspace.confirm_bulk_delete().await.unwrap();
    assert_eq!(outcome.deleted.len(), 1);
    assert!(workspace.is_empty());
    assert!(app
        .store
        .list_recent(Role::Teacher, 50)
        .await
        .unwrap()
        .is_empty());

    client.shutdown().await;
}

#[tokio::test]
async fn test_demo_submit_rejected_through_client() {
    let app = common::demo_app().await;
    let mut forms = FormCapture::new(ApiClient::new(serve(&app).await).unwrap());
    forms.student.name = "김철수".to_string();
    forms.student.grade_class = "3-2".to_string();
    forms.student.reason = "상담".to_string();

    let outcome = forms.submit_student().await;
    assert_eq!(
        outcome.message(),
        "데모 모드에서는 신청서를 제출할 수 없습니다."
    );
    assert_eq!(forms.student.name, "김철수");
}

#[tokio::test]
async fn test_settings_through_client() {
    let app = common::test_app().await;
    let client = ApiClient::connect(serve(&app).await).await.unwrap();
    client.sign_in(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();

    let saved = client
        .save_notification_settings(&NotificationConfig {
            webhook_url: "https://example.com/hook".to_string(),
            is_enabled: true,
        })
        .await
        .unwrap();
    assert!(saved.is_enabled);
    assert_eq!(client.notification_settings().await.unwrap(), saved);

    client.set_teacher_access_code("9999").await.unwrap();
    assert_eq!(client.teacher_access_code().await.unwrap().password, "9999");
}

#[tokio::test]
async fn test_signed_out_workspace_shows_permission_banner() {
    let app = common::test_app().await;
    let client = ApiClient::connect(serve(&app).await).await.unwrap();
    client.sign_in(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
    client.sign_out().await;

    let mut workspace = AdminWorkspace::new(client.clone());
    workspace.load_tab(Role::Student).await;
    assert_eq!(client.session(), SessionState::Anonymous);
    assert!(workspace.is_empty());
    assert_eq!(
        workspace.banner().unwrap().message(),
        "권한이 없습니다. 다시 로그인해주세요."
    );
}
