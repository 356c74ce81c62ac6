use crate::oauth::provider::{
    build_authorize_url, exchange_authorization_code, fetch_profile_json, not_configured,
    ErrorMessageField, OAuthProvider, ProviderProfile, TokenGrant,
};
use async_trait::async_trait;
use serde::Deserialize;
use socialhub_core::models::SocialPlatform;
use socialhub_core::{AppError, OAuthProviderSettings};

pub const INSTAGRAM_SCOPE: &str = "user_profile,user_media";

#[derive(Debug, Deserialize)]
struct InstagramMe {
    id: String,
    username: String,
    media_count: Option<i64>,
}

/// Instagram Basic Display: authorize/token on the auth origin, `/me` on Graph.
pub struct InstagramProvider {
    http: reqwest::Client,
    settings: OAuthProviderSettings,
}

impl InstagramProvider {
    pub fn new(http: reqwest::Client, settings: OAuthProviderSettings) -> Self {
        Self { http, settings }
    }

    fn credentials(&self) -> Result<(&str, &str), AppError> {
        self.settings
            .credentials()
            .ok_or_else(|| not_configured(SocialPlatform::Instagram))
    }
}

#[async_trait]
impl OAuthProvider for InstagramProvider {
    fn platform(&self) -> SocialPlatform {
        SocialPlatform::Instagram
    }

    fn is_configured(&self) -> bool {
        self.settings.is_configured()
    }

    fn authorize_url(&self, redirect_uri: &str, state: &str) -> Result<String, AppError> {
        let (client_id, _) = self.credentials()?;
        build_authorize_url(
            &format!("{}/oauth/authorize", self.settings.auth_base_url),
            client_id,
            redirect_uri,
            INSTAGRAM_SCOPE,
            state,
        )
    }

    #[tracing::instrument(skip(self, code), fields(platform = "instagram"))]
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenGrant, AppError> {
        let (client_id, client_secret) = self.credentials()?;
        exchange_authorization_code(
            &self.http,
            &format!("{}/oauth/access_token", self.settings.auth_base_url),
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ],
            ErrorMessageField::ErrorMessage,
        )
        .await
    }

    #[tracing::instrument(skip(self, access_token), fields(platform = "instagram"))]
    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, AppError> {
        let request = self
            .http
            .get(format!("{}/me", self.settings.api_base_url))
            .query(&[
                ("fields", "id,username,account_type,media_count"),
                ("access_token", access_token),
            ]);
        let me: InstagramMe = fetch_profile_json(request, SocialPlatform::Instagram).await?;

        let followers_count = me
            .media_count
            .map(|c| c.clamp(0, i32::MAX as i64) as i32)
            .unwrap_or(0);

        Ok(ProviderProfile {
            account_id: me.id,
            display_name: Some(me.username.clone()),
            username: me.username,
            profile_picture_url: None,
            followers_count,
        })
    }
}
