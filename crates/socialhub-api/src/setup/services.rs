//! Repository and service wiring

use crate::auth::{AuthFailureLimiter, AuthState, SessionTokenValidator};
use crate::constants::{AUTH_FAILURE_MAX, AUTH_FAILURE_WINDOW_SECS};
use crate::oauth::{InstagramProvider, LinkedInProvider, OAuthProvider, OAuthProviders, StateSigner};
use crate::services::{
    ConnectSettings, OAuthCallbackService, OrganizationResolver, SocialAccountService,
};
use crate::state::{AppState, DbState, ServiceState};
use anyhow::{Context, Result};
use socialhub_core::{Config, TokenCipher};
use socialhub_db::{
    InvitationRepository, MembershipRepository, OAuthStateRepository, OrganizationRepository,
    PostRepository, ProfileRepository, RevokedSessionRepository, SocialAccountRepository,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

const EXPIRED_ROW_PURGE_INTERVAL_SECS: u64 = 3600;

/// Build the application state from config and a migrated pool
pub fn initialize_services(config: &Config, pool: PgPool) -> Result<Arc<AppState>> {
    let db = DbState {
        organization_repository: OrganizationRepository::new(pool.clone()),
        membership_repository: MembershipRepository::new(pool.clone()),
        invitation_repository: InvitationRepository::new(pool.clone()),
        profile_repository: ProfileRepository::new(pool.clone()),
        social_account_repository: SocialAccountRepository::new(pool.clone()),
        post_repository: PostRepository::new(pool.clone()),
        revoked_session_repository: RevokedSessionRepository::new(pool.clone()),
        pool: pool.clone(),
    };
    let oauth_states = OAuthStateRepository::new(pool);

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.oauth_http_timeout_secs()))
        .connect_timeout(Duration::from_secs(5))
        .build()
        .context("Failed to build OAuth HTTP client")?;

    let providers = OAuthProviders::new(vec![
        Arc::new(InstagramProvider::new(http.clone(), config.instagram().clone()))
            as Arc<dyn OAuthProvider>,
        Arc::new(LinkedInProvider::new(http, config.linkedin().clone())),
    ]);

    let cipher = Arc::new(
        TokenCipher::from_base64_key(config.encryption_key())
            .map_err(|e| anyhow::anyhow!("Invalid ENCRYPTION_KEY: {}", e))?,
    );
    let signer = StateSigner::new(config.oauth_state_secret());
    let connect_settings = ConnectSettings {
        public_base_url: config.public_base_url().to_string(),
        state_ttl_secs: config.oauth_state_ttl_secs(),
        use_mock: config.use_mock_social_connect(),
    };

    let accounts = Arc::new(db.social_account_repository.clone());
    let states = Arc::new(oauth_states.clone());

    let services = ServiceState {
        organization_resolver: OrganizationResolver::new(
            Arc::new(db.organization_repository.clone()),
            Arc::new(db.profile_repository.clone()),
        ),
        social_accounts: SocialAccountService::new(
            accounts.clone(),
            states.clone(),
            providers.clone(),
            signer.clone(),
            cipher.clone(),
            connect_settings.clone(),
        ),
        oauth_callback: OAuthCallbackService::new(
            accounts,
            states,
            providers,
            signer,
            cipher,
            connect_settings,
        ),
    };

    let auth_failure_limiter = Arc::new(AuthFailureLimiter::new(
        AUTH_FAILURE_MAX,
        AUTH_FAILURE_WINDOW_SECS,
    ));
    let auth = Arc::new(AuthState {
        validator: SessionTokenValidator::new(config.jwt_secret()),
        revoked_sessions: db.revoked_session_repository.clone(),
        auth_failure_limiter: Some(auth_failure_limiter.clone()),
    });

    start_expired_row_purge(
        oauth_states,
        db.revoked_session_repository.clone(),
        auth_failure_limiter,
    );

    tracing::info!(
        mock_social_connect = config.use_mock_social_connect(),
        "Services initialized"
    );

    Ok(Arc::new(AppState {
        db,
        services,
        auth,
        is_production: config.is_production(),
        config: config.clone(),
    }))
}

/// Periodically drop expired OAuth states, revoked-session rows and
/// auth-failure windows that have elapsed.
fn start_expired_row_purge(
    states: OAuthStateRepository,
    revoked: RevokedSessionRepository,
    limiter: Arc<AuthFailureLimiter>,
) {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(Duration::from_secs(EXPIRED_ROW_PURGE_INTERVAL_SECS));
        loop {
            interval.tick().await;
            match states.purge_expired().await {
                Ok(n) if n > 0 => tracing::debug!(removed = n, "Purged expired OAuth states"),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Failed to purge expired OAuth states"),
            }
            match revoked.purge_expired().await {
                Ok(n) if n > 0 => tracing::debug!(removed = n, "Purged expired revoked sessions"),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Failed to purge revoked sessions"),
            }
            let released = limiter.purge_expired().await;
            if released > 0 {
                tracing::debug!(removed = released, "Purged elapsed auth-failure windows");
            }
        }
    });
}
