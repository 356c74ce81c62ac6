//! Organization member management
//!
//! Listing is open to every member. Changing roles and removing members
//! requires owner or admin, and the owner itself is untouchable.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::OrgContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use socialhub_core::models::{MemberRole, MemberWithProfile, Membership, UpdateMemberRoleRequest};
use socialhub_core::AppError;

/// List members with their profiles, owner first
#[utoipa::path(
    get,
    path = "/api/v1/organization/members",
    responses(
        (status = 200, description = "Members of the organization", body = Vec<MemberWithProfile>)
    ),
    tag = "members"
)]
#[tracing::instrument(skip(state, ctx), fields(organization_id = %ctx.organization_id()))]
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    ctx: OrgContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let members = state
        .db
        .membership_repository
        .list_with_profiles(ctx.organization_id())
        .await?;
    Ok(Json(members))
}

async fn load_non_owner(
    state: &AppState,
    ctx: &OrgContext,
    id: Uuid,
) -> Result<Membership, AppError> {
    let member = state
        .db
        .membership_repository
        .get(ctx.organization_id(), id)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    if member.role == MemberRole::Owner {
        return Err(AppError::Forbidden(
            "The organization owner cannot be changed or removed".to_string(),
        ));
    }
    Ok(member)
}

/// Change a member's role
#[utoipa::path(
    patch,
    path = "/api/v1/organization/members/{id}",
    params(("id" = Uuid, Path, description = "Membership ID")),
    request_body = UpdateMemberRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = Membership),
        (status = 403, description = "Caller cannot manage members, or target is the owner"),
        (status = 404, description = "Member not found")
    ),
    tag = "members"
)]
#[tracing::instrument(skip(state, ctx, request), fields(organization_id = %ctx.organization_id()))]
pub async fn update_member_role(
    State(state): State<Arc<AppState>>,
    ctx: OrgContext,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateMemberRoleRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_user_manager()?;
    if !request.role.is_assignable() {
        return Err(AppError::Forbidden("No member can be promoted to owner".to_string()).into());
    }

    load_non_owner(&state, &ctx, id).await?;

    let updated = state
        .db
        .membership_repository
        .update_role(ctx.organization_id(), id, request.role)
        .await?
        .ok_or_else(|| AppError::NotFound("Member not found".to_string()))?;

    tracing::info!(member_id = %id, role = %request.role, "Member role changed");
    Ok(Json(updated))
}

/// Remove a member from the organization
#[utoipa::path(
    delete,
    path = "/api/v1/organization/members/{id}",
    params(("id" = Uuid, Path, description = "Membership ID")),
    responses(
        (status = 204, description = "Member removed"),
        (status = 403, description = "Caller cannot manage members, or target is the owner"),
        (status = 404, description = "Member not found")
    ),
    tag = "members"
)]
#[tracing::instrument(skip(state, ctx), fields(organization_id = %ctx.organization_id()))]
pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    ctx: OrgContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_user_manager()?;
    load_non_owner(&state, &ctx, id).await?;

    let removed = state
        .db
        .membership_repository
        .remove(ctx.organization_id(), id)
        .await?;
    if !removed {
        return Err(AppError::NotFound("Member not found".to_string()).into());
    }

    tracing::info!(member_id = %id, "Member removed");
    Ok(StatusCode::NO_CONTENT)
}
