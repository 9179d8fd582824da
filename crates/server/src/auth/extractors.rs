use axum::{extract::FromRequestParts, http::request::Parts};
use shared_types::AppError;

use super::jwt::Claims;

/// Message shown when a protected route is hit without a session.
pub const LOGIN_REQUIRED: &str = "로그인이 필요합니다.";

/// Extractor that requires a signed-in administrator.
/// Returns 401 without a valid token, 403 for a non-admin role.
pub struct AdminRequired(pub Claims);

impl<S: Send + Sync> FromRequestParts<S> for AdminRequired {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized(LOGIN_REQUIRED))?;

        if !claims.is_admin() {
            return Err(AppError::forbidden("관리자만 접근할 수 있습니다."));
        }

        Ok(AdminRequired(claims))
    }
}

/// Extractor that optionally extracts auth claims. Never fails.
pub struct MaybeAuth(pub Option<Claims>);

impl<S: Send + Sync> FromRequestParts<S> for MaybeAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeAuth(parts.extensions.get::<Claims>().cloned()))
    }
}
