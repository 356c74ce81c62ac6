use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::AppError;

/// Social network a connected account lives on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "social_platform", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    Instagram,
    Linkedin,
    Facebook,
    Twitter,
}

impl SocialPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            SocialPlatform::Instagram => "instagram",
            SocialPlatform::Linkedin => "linkedin",
            SocialPlatform::Facebook => "facebook",
            SocialPlatform::Twitter => "twitter",
        }
    }

    /// Platforms with an OAuth connect flow
    pub fn supports_connect(&self) -> bool {
        matches!(self, SocialPlatform::Instagram | SocialPlatform::Linkedin)
    }

    /// Prefix of the popup message type, e.g. `INSTAGRAM_SUCCESS`
    pub fn message_prefix(&self) -> &'static str {
        match self {
            SocialPlatform::Instagram => "INSTAGRAM",
            SocialPlatform::Linkedin => "LINKEDIN",
            SocialPlatform::Facebook => "FACEBOOK",
            SocialPlatform::Twitter => "TWITTER",
        }
    }
}

impl fmt::Display for SocialPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SocialPlatform {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "instagram" => Ok(SocialPlatform::Instagram),
            "linkedin" => Ok(SocialPlatform::Linkedin),
            "facebook" => Ok(SocialPlatform::Facebook),
            "twitter" => Ok(SocialPlatform::Twitter),
            other => Err(AppError::BadRequest(format!(
                "Unsupported platform: {}",
                other
            ))),
        }
    }
}

/// Stored social account row. Tokens hold ciphertext, never plaintext.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SocialAccount {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub platform: SocialPlatform,
    pub account_id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub profile_picture_url: Option<String>,
    pub followers_count: i32,
    pub is_active: bool,
    pub connected_by: Option<Uuid>,
    pub connected_at: DateTime<Utc>,
    pub last_sync_at: Option<DateTime<Utc>>,
}

/// Values written by an upsert keyed on `(organization_id, platform, account_id)`
#[derive(Debug, Clone)]
pub struct NewSocialAccount {
    pub organization_id: Uuid,
    pub platform: SocialPlatform,
    pub account_id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub access_token_encrypted: String,
    pub refresh_token_encrypted: Option<String>,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub profile_picture_url: Option<String>,
    pub followers_count: i32,
    pub connected_by: Uuid,
}

/// API view of a social account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SocialAccountResponse {
    pub id: Uuid,
    pub platform: SocialPlatform,
    pub account_id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub profile_picture_url: Option<String>,
    pub followers_count: i32,
    pub is_active: bool,
    pub connected_at: DateTime<Utc>,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub token_expires_at: Option<DateTime<Utc>>,
}

impl From<SocialAccount> for SocialAccountResponse {
    fn from(account: SocialAccount) -> Self {
        Self {
            id: account.id,
            platform: account.platform,
            account_id: account.account_id,
            username: account.username,
            display_name: account.display_name,
            profile_picture_url: account.profile_picture_url,
            followers_count: account.followers_count,
            is_active: account.is_active,
            connected_at: account.connected_at,
            last_sync_at: account.last_sync_at,
            token_expires_at: account.token_expires_at,
        }
    }
}

/// Outcome of a connect request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ConnectResponse {
    /// Open `authorize_url` in a popup
    Redirect { authorize_url: String },
    /// Synthetic account inserted directly
    Mock { account: SocialAccountResponse },
}
