use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SocialPlatform;

/// Server-side record behind a signed OAuth `state` parameter.
///
/// Single use: consumed (deleted) by the callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OAuthState {
    pub id: Uuid,
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub platform: SocialPlatform,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl OAuthState {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
