use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};

use shared_types::{AdminUser, AppError, AuthResponse, LoginRequest};

use crate::auth::extractors::{AdminRequired, MaybeAuth, LOGIN_REQUIRED};
use crate::auth::{cookies, jwt, password as pw, ADMIN_ROLE};
use crate::error_convert::ValidateRequest;
use crate::storage::RecordStore;

pub const INVALID_CREDENTIALS: &str = "이메일 또는 비밀번호가 일치하지 않습니다.";

/// Sign in with email and password.
///
/// Sets the `intake_access` and `intake_refresh` cookies and also returns the
/// access token for clients that prefer a Bearer header.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Wrong email or password", body = AppError),
        (status = 429, description = "Too many attempts", body = AppError)
    ),
    tag = "auth"
)]
#[tracing::instrument(skip(store, payload), fields(email = %payload.email))]
pub async fn login(
    State(store): State<RecordStore>,
    Json(payload): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), AppError> {
    payload.validate_request()?;

    let account = store
        .find_admin_by_email(&payload.email)
        .await?
        .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

    let valid = pw::verify_password(&payload.password, &account.password_hash)
        .map_err(|e| AppError::internal(e.to_string()))?;

    if !valid {
        tracing::warn!("Sign-in rejected");
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    }

    let access_token = jwt::create_access_token(account.id, &account.email, ADMIN_ROLE)
        .map_err(|e| AppError::internal(e.to_string()))?;
    let (refresh_token, expires_at) =
        jwt::create_refresh_token(account.id, &account.email, ADMIN_ROLE)
            .map_err(|e| AppError::internal(e.to_string()))?;

    store
        .store_refresh_token(account.id, &jwt::hash_token(&refresh_token), expires_at)
        .await?;

    let mut headers = HeaderMap::new();
    cookies::set_auth_cookies(&mut headers, &access_token, &refresh_token);

    tracing::info!(admin_id = account.id, "Administrator signed in");
    Ok((
        headers,
        Json(AuthResponse {
            admin: account.to_user(),
            access_token,
        }),
    ))
}

/// Sign out: revoke refresh tokens and clear the cookies. Always succeeds.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 204, description = "Signed out")),
    tag = "auth"
)]
#[tracing::instrument(skip(store, auth))]
pub async fn logout(
    State(store): State<RecordStore>,
    MaybeAuth(auth): MaybeAuth,
) -> (StatusCode, HeaderMap) {
    if let Some(claims) = auth {
        if let Err(e) = store.revoke_refresh_tokens(claims.sub).await {
            tracing::warn!(admin_id = claims.sub, error = %e, "Failed to revoke refresh tokens");
        }
        tracing::info!(admin_id = claims.sub, "Administrator signed out");
    }

    let mut headers = HeaderMap::new();
    cookies::clear_auth_cookies(&mut headers);
    (StatusCode::NO_CONTENT, headers)
}

/// The signed-in administrator, or 401.
#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses(
        (status = 200, description = "Current administrator", body = AdminUser),
        (status = 401, description = "Not signed in", body = AppError)
    ),
    tag = "auth"
)]
#[tracing::instrument(skip(store, admin))]
pub async fn session(
    State(store): State<RecordStore>,
    admin: AdminRequired,
) -> Result<Json<AdminUser>, AppError> {
    store
        .find_admin(admin.0.sub)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::unauthorized(LOGIN_REQUIRED))
}
