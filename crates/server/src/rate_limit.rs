use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared_types::AppError;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::config::env_parse;

/// Sliding window rate limit state shared across requests.
#[derive(Clone)]
pub struct RateLimitState {
    inner: Arc<Mutex<RateLimitInner>>,
}

struct RateLimitInner {
    /// Map from client key -> list of request timestamps.
    requests: HashMap<String, Vec<Instant>>,
    max_requests: u32,
    window: Duration,
    message: &'static str,
}

impl RateLimitState {
    /// Create rate limiter allowing `max_requests` per `window`.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RateLimitInner {
                requests: HashMap::new(),
                max_requests,
                window,
                message: "요청이 너무 많습니다. 잠시 후 다시 시도해주세요.",
            })),
        }
    }

    /// Replace the message sent with 429 responses.
    pub fn with_message(self, message: &'static str) -> Self {
        self.inner.lock().unwrap_or_else(|p| p.into_inner()).message = message;
        self
    }

    fn message(&self) -> &'static str {
        self.inner.lock().unwrap_or_else(|p| p.into_inner()).message
    }

    /// Login limiter: `LOGIN_RATE_LIMIT` attempts per minute, 10 by default.
    pub fn for_login() -> Self {
        Self::new(env_parse("LOGIN_RATE_LIMIT", 10), Duration::from_secs(60))
            .with_message("로그인 시도가 너무 많습니다. 잠시 후 다시 시도해주세요.")
    }

    /// Check if a request from `key` is allowed, recording it when it is.
    pub fn check(&self, key: &str) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        let now = Instant::now();
        let window = inner.window;
        let max = inner.max_requests;

        // Drop clients whose whole history has aged out.
        inner
            .requests
            .retain(|_, stamps| stamps.last().is_some_and(|t| now.duration_since(*t) < window));

        let timestamps = inner.requests.entry(key.to_string()).or_default();
        timestamps.retain(|t| now.duration_since(*t) < window);

        if timestamps.len() as u32 >= max {
            return false;
        }

        timestamps.push(now);
        true
    }
}

/// Client key: first `X-Forwarded-For` hop, since the app runs behind a proxy.
fn client_key(request: &Request) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Axum middleware that enforces the limiter per client.
pub async fn rate_limit_middleware(
    State(state): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(&request);

    if !state.check(&key) {
        tracing::warn!(client = %key, "Rate limit exceeded");
        return AppError::rate_limited(state.message()).into_response();
    }

    next.run(request).await
}
