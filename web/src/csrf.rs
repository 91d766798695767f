//! CSRF token issuance and the middleware that enforces it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Header carrying the token on state-changing requests.
pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// Default lifetime of an issued token.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// Default number of live tokens kept before the oldest is evicted.
pub const DEFAULT_MAX_TOKENS: usize = 1024;

/// Store of issued, unexpired tokens, bounded to `max_tokens` entries.
pub struct CsrfTokens {
    ttl: Duration,
    max_tokens: usize,
    issued: Mutex<HashMap<String, Instant>>,
}

impl CsrfTokens {
    pub fn new(ttl: Duration) -> Self {
        Self::with_limit(ttl, DEFAULT_MAX_TOKENS)
    }

    pub fn with_limit(ttl: Duration, max_tokens: usize) -> Self {
        Self {
            ttl,
            max_tokens: max_tokens.max(1),
            issued: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Instant>> {
        self.issued.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Issue a fresh token, dropping any that have expired. When the store
    /// is full the oldest token is evicted.
    pub fn issue(&self) -> String {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let now = Instant::now();
        let mut issued = self.lock();
        issued.retain(|_, at| now.duration_since(*at) < self.ttl);
        while issued.len() >= self.max_tokens {
            let oldest = issued
                .iter()
                .min_by_key(|(_, at)| **at)
                .map(|(t, _)| t.clone());
            match oldest {
                Some(t) => {
                    issued.remove(&t);
                }
                None => break,
            }
        }
        issued.insert(token.clone(), now);
        token
    }

    /// Whether `token` was issued by this store and is still live.
    pub fn verify(&self, token: &str) -> bool {
        self.lock()
            .get(token)
            .is_some_and(|at| at.elapsed() < self.ttl)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Default for CsrfTokens {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_TTL)
    }
}

fn is_safe(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Reject non-safe requests that lack a live token.
pub async fn require_token(
    State(tokens): State<Arc<CsrfTokens>>,
    request: Request,
    next: Next,
) -> Response {
    if is_safe(request.method()) {
        return next.run(request).await;
    }
    let valid = request
        .headers()
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|token| tokens.verify(token));
    if !valid {
        tracing::debug!(method = %request.method(), uri = %request.uri(), "CSRF check failed");
        return (StatusCode::FORBIDDEN, "invalid CSRF token").into_response();
    }
    next.run(request).await
}
