//! OAuth callback: verify state, exchange the code, fetch the profile,
//! upsert the account and tell the popup's opener how it went.

use crate::oauth::{OAuthProviders, PopupOutcome, StateSigner};
use crate::services::social_accounts::ConnectSettings;
use chrono::{Duration, Utc};
use serde::Deserialize;
use socialhub_core::models::{NewSocialAccount, SocialAccount, SocialPlatform};
use socialhub_core::{AppError, OAuthErrorKind, TokenCipher};
use socialhub_db::{OAuthStateStore, SocialAccountStore};
use std::sync::Arc;
use utoipa::IntoParams;

/// Query parameters the provider redirects back with
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Clone)]
pub struct OAuthCallbackService {
    accounts: Arc<dyn SocialAccountStore>,
    states: Arc<dyn OAuthStateStore>,
    providers: OAuthProviders,
    signer: StateSigner,
    cipher: Arc<TokenCipher>,
    settings: ConnectSettings,
}

impl OAuthCallbackService {
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

    /// Run one callback to its terminal page. Never fails: every error is
    /// reported to the opener window.
    #[tracing::instrument(skip(self, params), fields(platform = %platform))]
    pub async fn handle(&self, platform: SocialPlatform, params: CallbackParams) -> PopupOutcome {
        if let Some(error) = params.error.as_deref() {
            let kind = OAuthErrorKind::from_provider(Some(error), None);
            tracing::info!(
                code = kind.code(),
                description = params.error_description.as_deref().unwrap_or(""),
                "Provider returned an error to the callback"
            );
            return PopupOutcome::Close;
        }

        match self.complete(platform, params).await {
            Ok(account) => {
                tracing::info!(
                    account_id = %account.id,
                    organization_id = %account.organization_id,
                    "Social account connected"
                );
                PopupOutcome::Success(platform)
            }
            Err(err) => {
                tracing::warn!(error = %err, "OAuth callback failed");
                PopupOutcome::Failure(platform, popup_message(&err, platform))
            }
        }
    }

    async fn complete(
        &self,
        platform: SocialPlatform,
        params: CallbackParams,
    ) -> Result<SocialAccount, AppError> {
        let code = params
            .code
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| {
                AppError::oauth(OAuthErrorKind::MissingCode, "No authorization code received")
            })?;
        let state = params
            .state
            .ok_or_else(|| AppError::oauth(OAuthErrorKind::InvalidState, "Missing OAuth state"))?;

        let nonce = self.signer.verify(&state)?;
        let record = self.states.consume(nonce).await?.ok_or_else(|| {
            AppError::oauth(
                OAuthErrorKind::InvalidState,
                "OAuth state is unknown or was already used",
            )
        })?;
        if record.is_expired(Utc::now()) {
            return Err(AppError::oauth(
                OAuthErrorKind::ExpiredState,
                "OAuth state has expired",
            ));
        }
        if record.platform != platform {
            return Err(AppError::oauth(
                OAuthErrorKind::PlatformMismatch,
                format!("OAuth state was issued for {}", record.platform),
            ));
        }

        let provider = self.providers.get(platform)?;
        let redirect_uri = self.settings.redirect_uri(platform);
        let grant = provider.exchange_code(&code, &redirect_uri).await?;
        let profile = provider.fetch_profile(&grant.access_token).await?;

        let account = NewSocialAccount {
            organization_id: record.organization_id,
            platform,
            account_id: profile.account_id,
            username: profile.username,
            display_name: profile.display_name,
            access_token_encrypted: self.cipher.encrypt(&grant.access_token)?,
            refresh_token_encrypted: self.cipher.encrypt_opt(grant.refresh_token.as_deref())?,
            token_expires_at: grant.expires_in.map(|secs| Utc::now() + Duration::seconds(secs)),
            profile_picture_url: profile.profile_picture_url,
            followers_count: profile.followers_count,
            connected_by: record.user_id,
        };

        self.accounts.upsert(&account).await
    }
}

/// Text for the opener. OAuth failures carry a message meant for users;
/// anything else stays generic.
fn popup_message(err: &AppError, platform: SocialPlatform) -> String {
    match err {
        AppError::OAuth { message, .. } => message.clone(),
        _ => format!("Failed to connect {} account", platform),
    }
}
