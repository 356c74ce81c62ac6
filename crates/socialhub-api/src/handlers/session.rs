//! Current session and sign-out

use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::auth::SessionContext;
use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct SignOutResponse {
    /// False when the token carries no `jti` and cannot be revoked
    pub revoked: bool,
}

/// The authenticated session
#[utoipa::path(
    get,
    path = "/api/v1/session",
    responses(
        (status = 200, description = "Current session", body = SessionContext),
        (status = 401, description = "Missing, invalid or revoked session")
    ),
    tag = "session"
)]
pub async fn get_session(session: SessionContext) -> impl IntoResponse {
    Json(session)
}

/// Revoke the presented session token until it expires
#[utoipa::path(
    post,
    path = "/api/v1/session/sign-out",
    responses(
        (status = 200, description = "Sign-out result", body = SignOutResponse)
    ),
    tag = "session"
)]
#[tracing::instrument(skip(state, session), fields(user_id = %session.user_id))]
pub async fn sign_out(
    State(state): State<Arc<AppState>>,
    session: SessionContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let Some(jti) = session.session_id.as_deref() else {
        tracing::debug!("Session token has no jti, nothing to revoke");
        return Ok(Json(SignOutResponse { revoked: false }));
    };

    state
        .db
        .revoked_session_repository
        .revoke(jti, session.user_id, session.expires_at)
        .await?;

    tracing::info!("Session signed out");
    Ok(Json(SignOutResponse { revoked: true }))
}
