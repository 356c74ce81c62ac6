//! Application state and sub-state extractors.
//!
//! Handlers extract only the slice they need via Axum's `FromRef`.

use crate::auth::middleware::AuthState;
use crate::services::{OAuthCallbackService, OrganizationResolver, SocialAccountService};
use socialhub_core::Config;
use socialhub_db::{
    InvitationRepository, MembershipRepository, OrganizationRepository, PostRepository,
    ProfileRepository, RevokedSessionRepository, SocialAccountRepository,
};
use sqlx::PgPool;
use std::sync::Arc;

/// Database pool and the repositories handlers use directly.
#[derive(Clone)]
pub struct DbState {
    pub pool: PgPool,
    pub organization_repository: OrganizationRepository,
    pub membership_repository: MembershipRepository,
    pub invitation_repository: InvitationRepository,
    pub profile_repository: ProfileRepository,
    pub social_account_repository: SocialAccountRepository,
    pub post_repository: PostRepository,
    pub revoked_session_repository: RevokedSessionRepository,
}

/// Services that hold business rules spanning more than one repository.
#[derive(Clone)]
pub struct ServiceState {
    pub organization_resolver: OrganizationResolver,
    pub social_accounts: SocialAccountService,
    pub oauth_callback: OAuthCallbackService,
}

/// Main application state
#[derive(Clone)]
pub struct AppState {
    pub db: DbState,
    pub services: ServiceState,
    pub auth: Arc<AuthState>,
    pub config: Config,
    pub is_production: bool,
}

impl axum::extract::FromRef<Arc<AppState>> for DbState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.db.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for ServiceState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.services.clone()
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
