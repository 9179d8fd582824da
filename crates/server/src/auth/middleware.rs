use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use super::cookies;
use super::jwt::{self, hash_token, validate_access_token, validate_refresh_token};
use crate::storage::RecordStore;

/// Permissive auth middleware.
///
/// Validates the access token (cookie or Bearer header) and inserts its
/// `Claims` into request extensions. When the access token is missing or
/// stale, a valid refresh cookie is rotated transparently and the new pair
/// is set on the response. Unauthenticated requests pass through untouched;
/// the extractors decide who may call what.
pub async fn auth_middleware(
    State(store): State<RecordStore>,
    mut req: Request,
    next: Next,
) -> Response {
    let headers = req.headers().clone();

    let claims = cookies::extract_access_token(&headers)
        .and_then(|token| validate_access_token(&token).ok());

    let refreshed = match claims {
        Some(claims) => {
            req.extensions_mut().insert(claims);
            None
        }
        None => match cookies::extract_refresh_token(&headers) {
            Some(refresh_token) => try_transparent_refresh(&store, &refresh_token, &mut req).await,
            None => None,
        },
    };

    let mut response = next.run(req).await;

    if let Some((access, refresh)) = refreshed {
        // A handler that already rewrote the session (login, logout) wins.
        if !response.headers().contains_key(axum::http::header::SET_COOKIE) {
            cookies::set_auth_cookies(response.headers_mut(), &access, &refresh);
        }
    }

    response
}

/// Rotate a refresh token: the presented one is consumed and a fresh
/// access/refresh pair is issued.
async fn try_transparent_refresh(
    store: &RecordStore,
    refresh_token: &str,
    req: &mut Request,
) -> Option<(String, String)> {
    let claims = validate_refresh_token(refresh_token).ok()?;

    match store
        .consume_refresh_token(claims.sub, &hash_token(refresh_token))
        .await
    {
        Ok(true) => {}
        Ok(false) => return None,
        Err(e) => {
            tracing::warn!(admin_id = claims.sub, error = %e, "Refresh token lookup failed");
            return None;
        }
    }

    let new_access = jwt::create_access_token(claims.sub, &claims.email, &claims.role).ok()?;
    let (new_refresh, expires_at) =
        jwt::create_refresh_token(claims.sub, &claims.email, &claims.role).ok()?;

    if let Err(e) = store
        .store_refresh_token(claims.sub, &hash_token(&new_refresh), expires_at)
        .await
    {
        tracing::warn!(admin_id = claims.sub, error = %e, "Failed to persist rotated refresh token");
        return None;
    }

    let new_claims = validate_access_token(&new_access).ok()?;
    tracing::debug!(admin_id = new_claims.sub, "Session refreshed");
    req.extensions_mut().insert(new_claims);

    Some((new_access, new_refresh))
}
