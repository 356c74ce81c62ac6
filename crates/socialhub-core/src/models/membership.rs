use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Role of a member inside an organization
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Owner,
    Admin,
    Manager,
    Editor,
    Viewer,
    SocialMedia,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Owner => "owner",
            MemberRole::Admin => "admin",
            MemberRole::Manager => "manager",
            MemberRole::Editor => "editor",
            MemberRole::Viewer => "viewer",
            MemberRole::SocialMedia => "social_media",
        }
    }

    /// Members and invitations
    pub fn can_manage_users(&self) -> bool {
        matches!(self, MemberRole::Owner | MemberRole::Admin)
    }

    /// Disconnecting social accounts
    pub fn can_manage_accounts(&self) -> bool {
        matches!(
            self,
            MemberRole::Owner | MemberRole::Admin | MemberRole::Manager
        )
    }

    pub fn can_approve_posts(&self) -> bool {
        self.can_manage_accounts()
    }

    pub fn can_edit_posts(&self) -> bool {
        !matches!(self, MemberRole::Viewer)
    }

    /// Owner is only ever assigned at organization creation.
    pub fn is_assignable(&self) -> bool {
        !matches!(self, MemberRole::Owner)
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Membership {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub role: MemberRole,
    pub invited_by: Option<Uuid>,
    pub joined_at: DateTime<Utc>,
}

/// Membership joined with the member's profile
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MemberWithProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub role: MemberRole,
    pub invited_by: Option<Uuid>,
    pub joined_at: DateTime<Utc>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateMemberRoleRequest {
    pub role: MemberRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_management_roles() {
        assert!(MemberRole::Owner.can_manage_users());
        assert!(MemberRole::Admin.can_manage_users());
        assert!(!MemberRole::Manager.can_manage_users());
        assert!(!MemberRole::SocialMedia.can_manage_users());
    }

    #[test]
    fn test_account_and_post_permissions() {
        assert!(MemberRole::Manager.can_manage_accounts());
        assert!(!MemberRole::Editor.can_manage_accounts());
        assert!(MemberRole::Editor.can_edit_posts());
        assert!(!MemberRole::Viewer.can_edit_posts());
        assert!(!MemberRole::Owner.is_assignable());
    }

    #[test]
    fn test_role_wire_format() {
        let json = serde_json::to_string(&MemberRole::SocialMedia).unwrap();
        assert_eq!(json, "\"social_media\"");
        let role: MemberRole = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, MemberRole::Admin);
    }
}
