use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// User profile mirrored from the identity provider
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Profile {
    pub id: Uuid,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl Profile {
    /// "First Last" when both parts are present and non-blank
    pub fn full_name(&self) -> Option<String> {
        let first = self.first_name.as_deref().map(str::trim).filter(|f| !f.is_empty())?;
        let last = self.last_name.as_deref().map(str::trim).filter(|l| !l.is_empty())?;
        Some(format!("{} {}", first, last))
    }
}
