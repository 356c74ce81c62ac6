//! Caller's organization

use axum::response::{IntoResponse, Json};

use crate::auth::OrgContext;
use crate::error::HttpAppError;
use socialhub_core::models::{OrganizationResponse, ResolvedOrganization};

/// Organization of the caller, created on first access
#[utoipa::path(
    get,
    path = "/api/v1/organization",
    responses(
        (status = 200, description = "Organization and caller role", body = OrganizationResponse),
        (status = 401, description = "Missing or invalid session")
    ),
    tag = "organization"
)]
#[tracing::instrument(skip(ctx), fields(user_id = %ctx.user_id()))]
pub async fn get_organization(ctx: OrgContext) -> Result<impl IntoResponse, HttpAppError> {
    let response = OrganizationResponse::from(ResolvedOrganization {
        organization: ctx.organization,
        role: ctx.role,
        created: false,
    });
    Ok(Json(response))
}
