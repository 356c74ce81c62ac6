use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::MemberRole;

/// Organization billing plan
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "organization_plan", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum OrganizationPlan {
    #[default]
    Free,
    Pro,
    Enterprise,
}

/// Tenant root. Every other row is scoped by `organization_id`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub plan: OrganizationPlan,
    #[schema(value_type = Object)]
    pub settings: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of resolving the caller's organization
#[derive(Debug, Clone)]
pub struct ResolvedOrganization {
    pub organization: Organization,
    pub role: MemberRole,
    /// True when this call created the organization
    pub created: bool,
}

/// Response for `GET /api/v1/organization`
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrganizationResponse {
    pub organization: Organization,
    pub role: MemberRole,
    pub can_manage_users: bool,
}

impl From<ResolvedOrganization> for OrganizationResponse {
    fn from(resolved: ResolvedOrganization) -> Self {
        Self {
            can_manage_users: resolved.role.can_manage_users(),
            organization: resolved.organization,
            role: resolved.role,
        }
    }
}
