use crate::auth::client_ip::{extract_client_ip, trusted_proxy_count};
use crate::auth::jwt::SessionTokenValidator;
use crate::auth::models::SessionContext;
use crate::error::{ErrorResponse, HttpAppError};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use socialhub_core::AppError;
use socialhub_db::RevokedSessionRepository;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Counts failed authentications per client IP inside a fixed window.
#[derive(Clone)]
pub struct AuthFailureLimiter {
    inner: Arc<Mutex<HashMap<String, (u32, Instant)>>>,
    max_failures: u32,
    window: Duration,
}

impl AuthFailureLimiter {
    pub fn new(max_failures: u32, window_seconds: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            max_failures,
            window: Duration::from_secs(window_seconds),
        }
    }

    /// Record a failure; true once the IP has reached the limit.
    pub async fn record_failure(&self, ip: &str) -> bool {
        let mut guard = self.inner.lock().await;
        let now = Instant::now();
        let (count, reset_at) = guard
            .entry(ip.to_string())
            .or_insert((0, now + self.window));
        if now >= *reset_at {
            *count = 0;
            *reset_at = now + self.window;
        }
        *count += 1;
        *count >= self.max_failures
    }

    pub async fn is_blocked(&self, ip: &str) -> bool {
        let mut guard = self.inner.lock().await;
        match guard.get(ip) {
            Some((_, reset_at)) if Instant::now() >= *reset_at => {
                guard.remove(ip);
                false
            }
            Some((count, _)) => *count >= self.max_failures,
            None => false,
        }
    }

    /// Drop entries whose window has elapsed; returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut guard = self.inner.lock().await;
        let before = guard.len();
        let now = Instant::now();
        guard.retain(|_, (_, reset_at)| *reset_at > now);
        before - guard.len()
    }

    #[cfg(test)]
    async fn tracked_ips(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[derive(Clone)]
pub struct AuthState {
    pub validator: SessionTokenValidator,
    pub revoked_sessions: RevokedSessionRepository,
    pub auth_failure_limiter: Option<Arc<AuthFailureLimiter>>,
}

fn too_many_failures() -> Response {
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ErrorResponse::simple(
            "TOO_MANY_AUTH_FAILURES",
            "Too many failed auth attempts",
        )),
    )
        .into_response()
}

/// Validate the bearer session token and attach a `SessionContext`.
pub async fn session_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let socket_addr = request
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|info| info.0);
    let client_ip = extract_client_ip(
        request.headers(),
        socket_addr.as_ref(),
        trusted_proxy_count(),
    );

    if let Some(ref limiter) = auth_state.auth_failure_limiter {
        if limiter.is_blocked(&client_ip).await {
            return too_many_failures();
        }
    }

    match authenticate(&auth_state, request.headers()).await {
        Ok(session) => {
            tracing::debug!(user_id = %session.user_id, "Session authenticated");
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(AppError::Database(e)) => HttpAppError(AppError::Database(e)).into_response(),
        Err(e) => {
            tracing::info!(client_ip = %client_ip, reason = %e, "Authentication failed");
            if let Some(ref limiter) = auth_state.auth_failure_limiter {
                if limiter.record_failure(&client_ip).await {
                    return too_many_failures();
                }
            }
            HttpAppError(e).into_response()
        }
    }
}

async fn authenticate(auth_state: &AuthState, headers: &HeaderMap) -> Result<SessionContext, AppError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

    let token = header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Unauthorized("Invalid authorization header format".to_string())
    })?;

    let claims = auth_state.validator.validate(token)?;

    if let Some(jti) = claims.jti.as_deref() {
        if auth_state.revoked_sessions.is_revoked(jti).await? {
            return Err(AppError::Unauthorized("Session has been signed out".to_string()));
        }
    }

    Ok(SessionContext::from_claims(claims))
}
