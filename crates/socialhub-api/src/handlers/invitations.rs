//! Organization invitations
//!
//! Owners and admins invite by email. The raw token is returned once at
//! creation and later redeemed through `POST /invitations/accept` by a user
//! whose session email matches.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{OrgContext, SessionContext};
use crate::error::{HttpAppError, ValidatedJson};
use crate::services::invitations::{check_acceptable, generate_invitation_token};
use crate::state::AppState;
use socialhub_core::models::{
    AcceptInvitationRequest, CreateInvitationRequest, CreatedInvitationResponse,
    InvitationResponse, Membership, INVITATION_TTL_DAYS,
};
use socialhub_core::validation::normalize_email;
use socialhub_core::AppError;

/// Pending, unexpired invitations of the caller's organization
#[utoipa::path(
    get,
    path = "/api/v1/organization/invitations",
    responses(
        (status = 200, description = "Pending invitations", body = Vec<InvitationResponse>)
    ),
    tag = "invitations"
)]
#[tracing::instrument(skip(state, ctx), fields(organization_id = %ctx.organization_id()))]
pub async fn list_invitations(
    State(state): State<Arc<AppState>>,
    ctx: OrgContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let invitations: Vec<InvitationResponse> = state
        .db
        .invitation_repository
        .list_pending(ctx.organization_id())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(Json(invitations))
}

/// Invite someone by email
#[utoipa::path(
    post,
    path = "/api/v1/organization/invitations",
    request_body = CreateInvitationRequest,
    responses(
        (status = 201, description = "Invitation created; the token is only shown here", body = CreatedInvitationResponse),
        (status = 400, description = "Invalid email or role"),
        (status = 403, description = "Caller cannot manage members"),
        (status = 409, description = "An invitation for this email is already pending")
    ),
    tag = "invitations"
)]
#[tracing::instrument(skip(state, ctx, request), fields(organization_id = %ctx.organization_id()))]
pub async fn create_invitation(
    State(state): State<Arc<AppState>>,
    ctx: OrgContext,
    ValidatedJson(request): ValidatedJson<CreateInvitationRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_user_manager()?;
    if !request.role.is_assignable() {
        return Err(AppError::BadRequest("Invitations cannot grant the owner role".to_string()).into());
    }

    let email = normalize_email(&request.email);
    let token = generate_invitation_token();
    let expires_at = Utc::now() + Duration::days(INVITATION_TTL_DAYS);

    let invitation = state
        .db
        .invitation_repository
        .create(
            ctx.organization_id(),
            &email,
            request.role,
            &token,
            ctx.user_id(),
            expires_at,
        )
        .await?;

    tracing::info!(invitation_id = %invitation.id, role = %invitation.role, "Invitation created");

    let response = CreatedInvitationResponse {
        token: invitation.token.clone(),
        invitation: invitation.into(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Cancel a pending invitation
#[utoipa::path(
    delete,
    path = "/api/v1/organization/invitations/{id}",
    params(("id" = Uuid, Path, description = "Invitation ID")),
    responses(
        (status = 204, description = "Invitation cancelled"),
        (status = 403, description = "Caller cannot manage members"),
        (status = 404, description = "Invitation not found")
    ),
    tag = "invitations"
)]
#[tracing::instrument(skip(state, ctx), fields(organization_id = %ctx.organization_id()))]
pub async fn delete_invitation(
    State(state): State<Arc<AppState>>,
    ctx: OrgContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_user_manager()?;

    if !state
        .db
        .invitation_repository
        .delete(ctx.organization_id(), id)
        .await?
    {
        return Err(AppError::NotFound("Invitation not found".to_string()).into());
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Join an organization with an invitation token
///
/// Takes the bare session: resolving an organization here would create one
/// for a first-time user and make every acceptance conflict.
#[utoipa::path(
    post,
    path = "/api/v1/invitations/accept",
    request_body = AcceptInvitationRequest,
    responses(
        (status = 200, description = "Membership created", body = Membership),
        (status = 403, description = "Invitation was sent to another email"),
        (status = 404, description = "Unknown invitation token"),
        (status = 409, description = "Caller already belongs to an organization, or the invitation is no longer pending")
    ),
    tag = "invitations"
)]
#[tracing::instrument(skip(state, session, request), fields(user_id = %session.user_id))]
pub async fn accept_invitation(
    State(state): State<Arc<AppState>>,
    session: SessionContext,
    ValidatedJson(request): ValidatedJson<AcceptInvitationRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    if state
        .db
        .organization_repository
        .find_for_user(session.user_id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("You already belong to an organization".to_string()).into());
    }

    let invitation = state
        .db
        .invitation_repository
        .find_by_token(request.token.trim())
        .await?
        .ok_or_else(|| AppError::NotFound("Invitation not found".to_string()))?;

    check_acceptable(&invitation, session.email.as_deref(), Utc::now())?;

    state
        .db
        .profile_repository
        .ensure(session.user_id, session.email.as_deref())
        .await?;

    let membership = state
        .db
        .invitation_repository
        .accept(&invitation, session.user_id)
        .await?;

    tracing::info!(
        organization_id = %membership.organization_id,
        role = %membership.role,
        "Invitation accepted"
    );
    Ok(Json(membership))
}
