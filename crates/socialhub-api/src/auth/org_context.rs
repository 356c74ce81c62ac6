use crate::auth::models::SessionContext;
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use socialhub_core::models::{MemberRole, Organization};
use socialhub_core::AppError;
use std::sync::Arc;
use uuid::Uuid;

/// Session plus the caller's organization and role, resolved per request.
#[derive(Debug, Clone)]
pub struct OrgContext {
    pub session: SessionContext,
    pub organization: Organization,
    pub role: MemberRole,
}

impl OrgContext {
    pub fn organization_id(&self) -> Uuid {
        self.organization.id
    }

    pub fn user_id(&self) -> Uuid {
        self.session.user_id
    }

    pub fn require_user_manager(&self) -> Result<(), AppError> {
        if self.role.can_manage_users() {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Only owners and admins can manage members".to_string(),
            ))
        }
    }

    pub fn require_post_editor(&self) -> Result<(), AppError> {
        if self.role.can_edit_posts() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Viewers cannot modify posts".to_string()))
        }
    }
}

impl FromRequestParts<Arc<AppState>> for OrgContext {
    type Rejection = HttpAppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<SessionContext>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Missing session context".to_string()))?;

        let resolved = state
            .services
            .organization_resolver
            .resolve(&session)
            .await?;

        Ok(OrgContext {
            session,
            organization: resolved.organization,
            role: resolved.role,
        })
    }
}
