use axum::http::{header, HeaderMap, HeaderValue};
use cookie::Cookie;

use super::jwt;
use crate::config::{env_parse, env_value};

pub const INTAKE_ACCESS: &str = "intake_access";
pub const INTAKE_REFRESH: &str = "intake_refresh";

fn cookie_secure() -> bool {
    env_parse("COOKIE_SECURE", false)
}

fn cookie_domain() -> Option<String> {
    env_value("COOKIE_DOMAIN")
}

/// HTTP-only, `SameSite=Lax` cookie scoped to the whole site.
fn build_cookie(name: &'static str, value: &str, max_age: cookie::time::Duration) -> HeaderValue {
    let mut cookie = Cookie::build((name, value.to_string()))
        .http_only(true)
        .same_site(cookie::SameSite::Lax)
        .path("/")
        .max_age(max_age)
        .secure(cookie_secure());

    if let Some(domain) = cookie_domain() {
        cookie = cookie.domain(domain);
    }

    // Token values are base64url and never contain header-invalid bytes;
    // an unrepresentable value degrades to an empty (expiring) cookie.
    HeaderValue::from_str(&cookie.build().to_string())
        .unwrap_or_else(|_| HeaderValue::from_static("intake_invalid=; Max-Age=0; Path=/"))
}

pub fn build_access_cookie(token: &str, max_age_minutes: i64) -> HeaderValue {
    build_cookie(
        INTAKE_ACCESS,
        token,
        cookie::time::Duration::seconds(max_age_minutes * 60),
    )
}

pub fn build_refresh_cookie(token: &str, max_age_days: i64) -> HeaderValue {
    build_cookie(
        INTAKE_REFRESH,
        token,
        cookie::time::Duration::seconds(max_age_days * 86400),
    )
}

/// Access token from the cookie, falling back to a Bearer header for API clients.
pub fn extract_access_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_cookie(headers, INTAKE_ACCESS) {
        return Some(token);
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

pub fn extract_refresh_token(headers: &HeaderMap) -> Option<String> {
    extract_cookie(headers, INTAKE_REFRESH)
}

fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .filter_map(|piece| Cookie::parse(piece.trim().to_string()).ok())
        .find(|c| c.name() == name && !c.value().is_empty())
        .map(|c| c.value().to_string())
}

/// Set both auth cookies using the configured token lifetimes.
pub fn set_auth_cookies(headers: &mut HeaderMap, access_token: &str, refresh_token: &str) {
    headers.append(
        header::SET_COOKIE,
        build_access_cookie(access_token, jwt::access_token_expiry_minutes()),
    );
    headers.append(
        header::SET_COOKIE,
        build_refresh_cookie(refresh_token, jwt::refresh_token_expiry_days()),
    );
}

pub fn clear_auth_cookies(headers: &mut HeaderMap) {
    headers.append(
        header::SET_COOKIE,
        build_cookie(INTAKE_ACCESS, "", cookie::time::Duration::ZERO),
    );
    headers.append(
        header::SET_COOKIE,
        build_cookie(INTAKE_REFRESH, "", cookie::time::Duration::ZERO),
    );
}
