//! Provider redirect targets
//!
//! Public routes: the browser arrives here from the provider, without a
//! session. The signed `state` ties the callback to the user and
//! organization that started the flow. The response is always a small HTML
//! page that notifies the opener window and closes itself.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use std::sync::Arc;

use crate::services::CallbackParams;
use crate::state::AppState;
use socialhub_core::models::SocialPlatform;

async fn complete(
    state: &AppState,
    platform: SocialPlatform,
    params: CallbackParams,
) -> impl IntoResponse {
    state.services.oauth_callback.handle(platform, params).await
}

/// Instagram OAuth redirect target
#[utoipa::path(
    get,
    path = "/oauth/instagram/callback",
    params(CallbackParams),
    responses(
        (status = 200, description = "HTML page that posts INSTAGRAM_SUCCESS or INSTAGRAM_ERROR to the opener", content_type = "text/html")
    ),
    tag = "oauth"
)]
#[tracing::instrument(skip(state, params))]
pub async fn instagram_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> impl IntoResponse {
    complete(&state, SocialPlatform::Instagram, params).await
}

/// LinkedIn OAuth redirect target
#[utoipa::path(
    get,
    path = "/oauth/linkedin/callback",
    params(CallbackParams),
    responses(
        (status = 200, description = "HTML page that posts LINKEDIN_SUCCESS or LINKEDIN_ERROR to the opener", content_type = "text/html")
    ),
    tag = "oauth"
)]
#[tracing::instrument(skip(state, params))]
pub async fn linkedin_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> impl IntoResponse {
    complete(&state, SocialPlatform::Linkedin, params).await
}
