//! Social Account Registry: list, connect, disconnect and sync, always
//! scoped to the caller's organization.

use crate::constants::oauth_callback_path;
use crate::oauth::{OAuthProviders, StateSigner};
use socialhub_core::models::{
    ConnectResponse, MemberRole, NewSocialAccount, SocialAccountResponse, SocialPlatform,
};
use socialhub_core::{AppError, OAuthErrorKind, TokenCipher};
use socialhub_db::{OAuthStateStore, SocialAccountStore};
use std::sync::Arc;
use uuid::Uuid;

/// Settings that decide how a connect request is served
#[derive(Debug, Clone)]
pub struct ConnectSettings {
    pub public_base_url: String,
    pub state_ttl_secs: i64,
    /// Insert a synthetic account instead of starting OAuth
    pub use_mock: bool,
}

impl ConnectSettings {
    pub fn redirect_uri(&self, platform: SocialPlatform) -> String {
        format!(
            "{}{}",
            self.public_base_url.trim_end_matches('/'),
            oauth_callback_path(platform.as_str())
        )
    }
}

#[derive(Clone)]
pub struct SocialAccountService {
    accounts: Arc<dyn SocialAccountStore>,
    states: Arc<dyn OAuthStateStore>,
    providers: OAuthProviders,
    signer: StateSigner,
    cipher: Arc<TokenCipher>,
    settings: ConnectSettings,
}

impl SocialAccountService {
    pub fn new(
        accounts: Arc<dyn SocialAccountStore>,
        states: Arc<dyn OAuthStateStore>,
        providers: OAuthProviders,
        signer: StateSigner,
        cipher: Arc<TokenCipher>,
        settings: ConnectSettings,
    ) -> Self {
        Self {
            accounts,
            states,
            providers,
            signer,
            cipher,
            settings,
        }
    }

    pub async fn list(&self, organization_id: Uuid) -> Result<Vec<SocialAccountResponse>, AppError> {
        let accounts = self.accounts.list(organization_id).await?;
        Ok(accounts.into_iter().map(Into::into).collect())
    }

    /// Start a connect: an authorize URL carrying a signed state, or with
    /// the mock flag a synthetic account row.
    #[tracing::instrument(skip(self), fields(platform = %platform, mock = self.settings.use_mock))]
    pub async fn connect(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        platform: SocialPlatform,
    ) -> Result<ConnectResponse, AppError> {
        if !platform.supports_connect() {
            return Err(AppError::BadRequest(format!(
                "Connecting {} accounts is not supported",
                platform
            )));
        }

        if self.settings.use_mock {
            return self.connect_mock(user_id, organization_id, platform).await;
        }

        let provider = self.providers.get(platform)?;
        if !provider.is_configured() {
            return Err(AppError::oauth(
                OAuthErrorKind::NotConfigured,
                format!("{} connection is not configured", platform),
            ));
        }

        let record = self
            .states
            .create(user_id, organization_id, platform, self.settings.state_ttl_secs)
            .await?;
        let state = self.signer.sign(record.id)?;
        let authorize_url = provider.authorize_url(&self.settings.redirect_uri(platform), &state)?;

        Ok(ConnectResponse::Redirect { authorize_url })
    }

    async fn connect_mock(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        platform: SocialPlatform,
    ) -> Result<ConnectResponse, AppError> {
        let user_hex = user_id.simple().to_string();
        let handle = format!("mock_{}_{}", platform, &user_hex[..8]);
        let account = NewSocialAccount {
            organization_id,
            platform,
            account_id: handle.clone(),
            username: handle,
            display_name: Some(format!("Mock {} account", platform.message_prefix())),
            access_token_encrypted: self.cipher.encrypt("mock-access-token")?,
            refresh_token_encrypted: None,
            token_expires_at: None,
            profile_picture_url: None,
            followers_count: 0,
            connected_by: user_id,
        };

        let saved = self.accounts.upsert(&account).await?;
        tracing::info!(account_id = %saved.id, "Mock social account connected");
        Ok(ConnectResponse::Mock {
            account: saved.into(),
        })
    }

    /// Delete one of the organization's accounts. Rows of other
    /// organizations are indistinguishable from missing ones.
    #[tracing::instrument(skip(self))]
    pub async fn disconnect(
        &self,
        organization_id: Uuid,
        role: MemberRole,
        id: Uuid,
    ) -> Result<(), AppError> {
        if !role.can_manage_accounts() {
            return Err(AppError::Forbidden(
                "Only owners, admins and managers can disconnect accounts".to_string(),
            ));
        }

        if !self.accounts.delete(organization_id, id).await? {
            return Err(AppError::NotFound("Social account not found".to_string()));
        }

        tracing::info!(account_id = %id, "Social account disconnected");
        Ok(())
    }

    /// Stamp `last_sync_at`; no upstream fetch happens.
    #[tracing::instrument(skip(self))]
    pub async fn sync(&self, organization_id: Uuid, id: Uuid) -> Result<SocialAccountResponse, AppError> {
        self.accounts
            .touch_sync(organization_id, id)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound("Social account not found".to_string()))
    }
}
