//! Social account registry endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::OrgContext;
use crate::error::HttpAppError;
use crate::state::AppState;
use socialhub_core::models::{ConnectResponse, SocialAccountResponse, SocialPlatform};

/// Accounts connected to the caller's organization
#[utoipa::path(
    get,
    path = "/api/v1/social-accounts",
    responses(
        (status = 200, description = "Connected accounts, newest first", body = Vec<SocialAccountResponse>)
    ),
    tag = "social-accounts"
)]
#[tracing::instrument(skip(state, ctx), fields(organization_id = %ctx.organization_id()))]
pub async fn list_social_accounts(
    State(state): State<Arc<AppState>>,
    ctx: OrgContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let accounts = state
        .services
        .social_accounts
        .list(ctx.organization_id())
        .await?;
    Ok(Json(accounts))
}

/// Start connecting an account
///
/// Returns the provider authorize URL for the popup, or with mock mode the
/// inserted synthetic account.
#[utoipa::path(
    post,
    path = "/api/v1/social-accounts/{platform}/connect",
    params(("platform" = SocialPlatform, Path, description = "instagram or linkedin")),
    responses(
        (status = 200, description = "Authorize URL or mock account", body = ConnectResponse),
        (status = 400, description = "Unsupported or unconfigured platform")
    ),
    tag = "social-accounts"
)]
#[tracing::instrument(skip(state, ctx), fields(organization_id = %ctx.organization_id()))]
pub async fn connect_social_account(
    State(state): State<Arc<AppState>>,
    ctx: OrgContext,
    Path(platform): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let platform: SocialPlatform = platform.parse()?;
    let response = state
        .services
        .social_accounts
        .connect(ctx.user_id(), ctx.organization_id(), platform)
        .await?;
    Ok(Json(response))
}

/// Disconnect an account
#[utoipa::path(
    delete,
    path = "/api/v1/social-accounts/{id}",
    params(("id" = Uuid, Path, description = "Social account ID")),
    responses(
        (status = 204, description = "Account removed"),
        (status = 403, description = "Caller cannot manage accounts"),
        (status = 404, description = "Account not found")
    ),
    tag = "social-accounts"
)]
#[tracing::instrument(skip(state, ctx), fields(organization_id = %ctx.organization_id()))]
pub async fn disconnect_social_account(
    State(state): State<Arc<AppState>>,
    ctx: OrgContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state
        .services
        .social_accounts
        .disconnect(ctx.organization_id(), ctx.role, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Record a sync of the account
#[utoipa::path(
    post,
    path = "/api/v1/social-accounts/{id}/sync",
    params(("id" = Uuid, Path, description = "Social account ID")),
    responses(
        (status = 200, description = "Account with updated last_sync_at", body = SocialAccountResponse),
        (status = 404, description = "Account not found")
    ),
    tag = "social-accounts"
)]
#[tracing::instrument(skip(state, ctx), fields(organization_id = %ctx.organization_id()))]
pub async fn sync_social_account(
    State(state): State<Arc<AppState>>,
    ctx: OrgContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let account = state
        .services
        .social_accounts
        .sync(ctx.organization_id(), id)
        .await?;
    Ok(Json(account))
}
