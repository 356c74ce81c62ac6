//! Health check handlers

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
pub(super) struct HealthCheckResponse {
    pub status: &'static str,
    pub database: String,
    pub mock_social_connect: bool,
}

/// "healthy", "timeout" or "unhealthy: {error}"
async fn check_database(state: &AppState) -> String {
    match tokio::time::timeout(CHECK_TIMEOUT, sqlx::query("SELECT 1").execute(&state.db.pool)).await
    {
        Ok(Ok(_)) => "healthy".to_string(),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Database health check failed");
            format!("unhealthy: {}", e)
        }
        Err(_) => {
            tracing::error!("Database health check timed out");
            "timeout".to_string()
        }
    }
}

/// Liveness probe - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "alive" })))
}

/// Readiness probe - the database answers.
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database = check_database(&state).await;
    let ready = database == "healthy";
    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status_code,
        Json(serde_json::json!({
            "status": if ready { "ready" } else { "not_ready" },
            "database": database,
        })),
    )
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database = check_database(&state).await;
    let healthy = database == "healthy";
    let response = HealthCheckResponse {
        status: if healthy { "healthy" } else { "unhealthy" },
        database,
        mock_social_connect: state.config.use_mock_social_connect(),
    };
    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(response))
}
