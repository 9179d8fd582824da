use std::sync::{Arc, RwLock};

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use uuid::Uuid;

use shared_types::{
    AdminUser, AppError, AppErrorKind, AuthResponse, BulkDeleteRequest, BulkDeleteResponse,
    ExportDocument, LoginRequest, MessageResponse, NotificationConfig, ParentForm, Record,
    RecordListResponse, Role, Status, StudentForm, SubmitResponse, TeacherAccessRequest,
    TeacherAccessResponse, TeacherAuthConfig, TeacherForm, TeacherSubmission,
    UpdateStatusRequest, UpdateTeacherAccessRequest, GENERIC_ERROR_MESSAGE,
};

use crate::backend::{FormBackend, RecordBackend};
use crate::session::SessionState;

pub const UNREACHABLE: &str = "서버에 연결할 수 없습니다. 잠시 후 다시 시도해주세요.";
pub const INVALID_CREDENTIALS: &str = "이메일 또는 비밀번호가 일치하지 않습니다.";
pub const TOO_MANY_ATTEMPTS: &str = "로그인 시도가 너무 많습니다. 잠시 후 다시 시도해주세요.";

/// HTTP client for the intake API.
///
/// Holds the access token from sign-in and sends it as a Bearer header.
/// Session changes are published on a watch channel; see [`ApiClient::subscribe`].
/// Clones share the token and the channel.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
    session: Arc<watch::Sender<SessionState>>,
}

impl ApiClient {
    /// Build a client without touching the network. The session starts `Unknown`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, AppError> {
        let http = Client::builder()
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;
        let (tx, _) = watch::channel(SessionState::Unknown);

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(None)),
            session: Arc::new(tx),
        })
    }

    /// Build a client and resolve the session once.
    pub async fn connect(base_url: impl Into<String>) -> Result<Self, AppError> {
        let client = Self::new(base_url)?;
        client.refresh_session().await;
        Ok(client)
    }

    /// Sign out if signed in. The session ends `Anonymous`.
    pub async fn shutdown(self) {
        if self.session().is_authenticated() {
            self.sign_out().await;
        }
        tracing::debug!("API client shut down");
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Session ─────────────────────────────────────────────────────

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.session.subscribe()
    }

    pub fn session(&self) -> SessionState {
        self.session.borrow().clone()
    }

    fn publish(&self, state: SessionState) {
        self.session.send_replace(state);
    }

    fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set_token(&self, token: Option<String>) {
        *self
            .token
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = token;
    }

    /// Ask the server who is signed in and publish the answer.
    pub async fn refresh_session(&self) -> SessionState {
        let state = if self.token().is_none() {
            SessionState::Anonymous
        } else {
            match self.get_json::<AdminUser>("/api/auth/session").await {
                Ok(admin) => SessionState::Authenticated(admin),
                Err(e) => {
                    tracing::debug!(error = %e, "Session probe failed");
                    self.set_token(None);
                    SessionState::Anonymous
                }
            }
        };
        self.publish(state.clone());
        state
    }

    /// Sign in with email and password.
    ///
    /// Wrong credentials and rate limiting come back with fixed Korean
    /// messages regardless of what the server said.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AdminUser, AppError> {
        let body = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let response = self
            .send(self.request(Method::POST, "/api/auth/login").json(&body))
            .await
            .map_err(|e| match e.kind {
                AppErrorKind::Unauthorized => AppError::unauthorized(INVALID_CREDENTIALS),
                AppErrorKind::RateLimited => AppError::rate_limited(TOO_MANY_ATTEMPTS),
                _ => e,
            })?;
        let auth: AuthResponse = read_json(response).await?;

        self.set_token(Some(auth.access_token));
        self.publish(SessionState::Authenticated(auth.admin.clone()));
        tracing::info!(admin_id = auth.admin.id, "Signed in");
        Ok(auth.admin)
    }

    /// Revoke the session on the server and forget the token locally.
    /// A failed server call is logged; the local session ends either way.
    pub async fn sign_out(&self) {
        if self.token().is_some() {
            if let Err(e) = self.send(self.request(Method::POST, "/api/auth/logout")).await {
                tracing::warn!(error = %e, "Sign-out request failed");
            }
        }
        self.set_token(None);
        self.publish(SessionState::Anonymous);
    }

    // ── Transport ───────────────────────────────────────────────────

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match self.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and turn non-2xx responses into `AppError`.
    ///
    /// A 401 while holding a token means the session ended on the server, so
    /// the token is dropped and `Anonymous` is published.
    async fn send(&self, builder: RequestBuilder) -> Result<Response, AppError> {
        let response = builder.send().await.map_err(|e| {
            tracing::warn!(error = %e, "Request failed");
            AppError::internal(UNREACHABLE)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED && self.token().is_some() {
            self.set_token(None);
            self.publish(SessionState::Anonymous);
        }

        let body = response.text().await.unwrap_or_default();
        Err(AppError::from_response_body(&body)
            .unwrap_or_else(|| AppError::from_status(status.as_u16(), GENERIC_ERROR_MESSAGE)))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        read_json(response).await
    }

    // ── Admin extras ────────────────────────────────────────────────

    pub async fn get_record(&self, role: Role, id: Uuid) -> Result<Record, AppError> {
        self.get_json(&format!("/api/admin/{role}/records/{id}")).await
    }

    pub async fn export_preview(&self, role: Role, id: Uuid) -> Result<ExportDocument, AppError> {
        self.get_json(&format!("/api/admin/{role}/records/{id}/export/preview"))
            .await
    }

    /// Server-side bulk delete in one request.
    pub async fn bulk_delete(
        &self,
        role: Role,
        ids: Vec<Uuid>,
    ) -> Result<BulkDeleteResponse, AppError> {
        let response = self
            .send(
                self.request(Method::POST, &format!("/api/admin/{role}/records/bulk-delete"))
                    .json(&BulkDeleteRequest { ids }),
            )
            .await?;
        read_json(response).await
    }

    // ── Settings ────────────────────────────────────────────────────

    pub async fn notification_settings(&self) -> Result<NotificationConfig, AppError> {
        self.get_json("/api/admin/settings/notifications").await
    }

    pub async fn save_notification_settings(
        &self,
        config: &NotificationConfig,
    ) -> Result<NotificationConfig, AppError> {
        let response = self
            .send(
                self.request(Method::PUT, "/api/admin/settings/notifications")
                    .json(config),
            )
            .await?;
        read_json(response).await
    }

    /// Send a test alert; returns the server's confirmation text.
    pub async fn send_test_notification(
        &self,
        config: &NotificationConfig,
    ) -> Result<String, AppError> {
        let response = self
            .send(
                self.request(Method::POST, "/api/admin/settings/notifications/test")
                    .json(config),
            )
            .await?;
        let body: MessageResponse = read_json(response).await?;
        Ok(body.message)
    }

    pub async fn teacher_access_code(&self) -> Result<TeacherAuthConfig, AppError> {
        self.get_json("/api/admin/settings/teacher-access").await
    }

    pub async fn set_teacher_access_code(
        &self,
        password: &str,
    ) -> Result<TeacherAuthConfig, AppError> {
        let response = self
            .send(
                self.request(Method::PUT, "/api/admin/settings/teacher-access")
                    .json(&UpdateTeacherAccessRequest {
                        password: password.to_string(),
                    }),
            )
            .await?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    response
        .json()
        .await
        .map_err(|e| AppError::internal(format!("Unexpected response body: {e}")))
}

impl RecordBackend for ApiClient {
    async fn list(&self, role: Role) -> Result<Vec<Record>, AppError> {
        let body: RecordListResponse = self
            .get_json(&format!("/api/admin/{role}/records"))
            .await?;
        Ok(body.records)
    }

    async fn set_status(&self, role: Role, id: Uuid, status: Status) -> Result<Record, AppError> {
        let response = self
            .send(
                self.request(Method::PATCH, &format!("/api/admin/{role}/records/{id}/status"))
                    .json(&UpdateStatusRequest { status }),
            )
            .await?;
        read_json(response).await
    }

    async fn delete(&self, role: Role, id: Uuid) -> Result<(), AppError> {
        self.send(self.request(Method::DELETE, &format!("/api/admin/{role}/records/{id}")))
            .await?;
        Ok(())
    }

    async fn export_pdf(&self, role: Role, id: Uuid) -> Result<Vec<u8>, AppError> {
        let response = self
            .send(self.request(Method::GET, &format!("/api/admin/{role}/records/{id}/export")))
            .await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::internal(format!("Failed to read export: {e}")))?;
        Ok(bytes.to_vec())
    }
}

impl FormBackend for ApiClient {
    async fn submit_student(&self, form: &StudentForm) -> Result<SubmitResponse, AppError> {
        let response = self
            .send(self.request(Method::POST, "/api/forms/student").json(form))
            .await?;
        read_json(response).await
    }

    async fn submit_parent(&self, form: &ParentForm) -> Result<SubmitResponse, AppError> {
        let response = self
            .send(self.request(Method::POST, "/api/forms/parent").json(form))
            .await?;
        read_json(response).await
    }

    async fn check_teacher_code(&self, code: &str) -> Result<bool, AppError> {
        let request = TeacherAccessRequest {
            code: code.to_string(),
        };
        let result = self
            .send(
                self.request(Method::POST, "/api/forms/teacher/access")
                    .json(&request),
            )
            .await;

        match result {
            Ok(response) => {
                let body: TeacherAccessResponse = read_json(response).await?;
                Ok(body.granted)
            }
            Err(e) if e.kind == AppErrorKind::Forbidden => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn submit_teacher(
        &self,
        access_code: &str,
        form: &TeacherForm,
    ) -> Result<SubmitResponse, AppError> {
        let body = TeacherSubmission {
            access_code: access_code.to_string(),
            form: form.clone(),
        };
        let response = self
            .send(self.request(Method::POST, "/api/forms/teacher").json(&body))
            .await?;
        read_json(response).await
    }
}
