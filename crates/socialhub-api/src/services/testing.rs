//! In-memory stores backing the service unit tests

use crate::auth::SessionContext;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use socialhub_core::models::{
    MemberRole, NewSocialAccount, OAuthState, Organization, OrganizationPlan, Profile,
    ResolvedOrganization, SocialAccount, SocialPlatform,
};
use socialhub_core::AppError;
use socialhub_db::{OAuthStateStore, OrganizationStore, ProfileStore, SocialAccountStore};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub fn session() -> SessionContext {
    SessionContext {
        user_id: Uuid::new_v4(),
        email: Some("ada@example.com".to_string()),
        session_id: Some("s-1".to_string()),
        expires_at: Utc::now() + Duration::hours(1),
    }
}

#[derive(Default)]
struct Inner {
    organizations: HashMap<Uuid, Organization>,
    memberships: HashMap<Uuid, (Uuid, MemberRole)>,
    reserved_slugs: HashSet<String>,
    profile_name: (Option<String>, Option<String>),
    accounts: HashMap<Uuid, SocialAccount>,
    states: HashMap<Uuid, OAuthState>,
}

#[derive(Default, Clone)]
pub struct InMemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryStore {
    pub fn set_profile_name(&self, first: Option<&str>, last: Option<&str>) {
        self.inner.lock().unwrap().profile_name = (first.map(String::from), last.map(String::from));
    }

    pub fn reserve_slug(&self, slug: &str) {
        self.inner.lock().unwrap().reserved_slugs.insert(slug.to_string());
    }

    pub fn organization_count(&self) -> usize {
        self.inner.lock().unwrap().organizations.len()
    }

    pub fn accounts(&self) -> Vec<SocialAccount> {
        self.inner.lock().unwrap().accounts.values().cloned().collect()
    }

    pub fn state_count(&self) -> usize {
        self.inner.lock().unwrap().states.len()
    }

    pub fn insert_state(&self, state: OAuthState) {
        self.inner.lock().unwrap().states.insert(state.id, state);
    }

    pub fn insert_account(&self, organization_id: Uuid, platform: SocialPlatform) -> SocialAccount {
        let account = SocialAccount {
            id: Uuid::new_v4(),
            organization_id,
            platform,
            account_id: format!("ext-{}", Uuid::new_v4().simple()),
            username: "someone".to_string(),
            display_name: None,
            access_token: "ciphertext".to_string(),
            refresh_token: None,
            token_expires_at: None,
            profile_picture_url: None,
            followers_count: 10,
            is_active: true,
            connected_by: None,
            connected_at: Utc::now() - Duration::days(1),
            last_sync_at: None,
        };
        self.inner
            .lock()
            .unwrap()
            .accounts
            .insert(account.id, account.clone());
        account
    }
}

#[async_trait]
impl OrganizationStore for InMemoryStore {
    async fn find_for_user(&self, user_id: Uuid) -> Result<Option<ResolvedOrganization>, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.memberships.get(&user_id).map(|(org_id, role)| ResolvedOrganization {
            organization: inner.organizations[org_id].clone(),
            role: *role,
            created: false,
        }))
    }

    async fn create_with_owner(
        &self,
        user_id: Uuid,
        name: &str,
        slug: &str,
    ) -> Result<ResolvedOrganization, AppError> {
        // Yield so concurrent callers interleave between lookup and create
        tokio::task::yield_now().await;
        let mut inner = self.inner.lock().unwrap();
        if let Some((org_id, role)) = inner.memberships.get(&user_id).copied() {
            return Ok(ResolvedOrganization {
                organization: inner.organizations[&org_id].clone(),
                role,
                created: false,
            });
        }
        let taken = inner.reserved_slugs.contains(slug)
            || inner.organizations.values().any(|o| o.slug == slug);
        if taken {
            return Err(AppError::Conflict("Organization slug already taken".to_string()));
        }

        let now = Utc::now();
        let organization = Organization {
            id: Uuid::new_v4(),
            name: name.to_string(),
            slug: slug.to_string(),
            plan: OrganizationPlan::Free,
            settings: serde_json::json!({}),
            created_at: now,
            updated_at: now,
        };
        inner.organizations.insert(organization.id, organization.clone());
        inner.memberships.insert(user_id, (organization.id, MemberRole::Owner));
        Ok(ResolvedOrganization {
            organization,
            role: MemberRole::Owner,
            created: true,
        })
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn ensure(&self, user_id: Uuid, email: Option<&str>) -> Result<Profile, AppError> {
        let inner = self.inner.lock().unwrap();
        Ok(Profile {
            id: user_id,
            email: email.map(String::from),
            first_name: inner.profile_name.0.clone(),
            last_name: inner.profile_name.1.clone(),
            avatar_url: None,
        })
    }
}

#[async_trait]
impl SocialAccountStore for InMemoryStore {
    async fn list(&self, organization_id: Uuid) -> Result<Vec<SocialAccount>, AppError> {
        let inner = self.inner.lock().unwrap();
        let mut accounts: Vec<_> = inner
            .accounts
            .values()
            .filter(|a| a.organization_id == organization_id)
            .cloned()
            .collect();
        accounts.sort_by(|a, b| b.connected_at.cmp(&a.connected_at));
        Ok(accounts)
    }

    async fn upsert(&self, account: &NewSocialAccount) -> Result<SocialAccount, AppError> {
        let mut inner = self.inner.lock().unwrap();
        let existing = inner
            .accounts
            .values()
            .find(|a| {
                a.organization_id == account.organization_id
                    && a.platform == account.platform
                    && a.account_id == account.account_id
            })
            .cloned();

        let saved = SocialAccount {
            id: existing.as_ref().map(|a| a.id).unwrap_or_else(Uuid::new_v4),
            organization_id: account.organization_id,
            platform: account.platform,
            account_id: account.account_id.clone(),
            username: account.username.clone(),
            display_name: account.display_name.clone(),
            access_token: account.access_token_encrypted.clone(),
            refresh_token: account
                .refresh_token_encrypted
                .clone()
                .or_else(|| existing.as_ref().and_then(|a| a.refresh_token.clone())),
            token_expires_at: account.token_expires_at,
            profile_picture_url: account.profile_picture_url.clone(),
            followers_count: account.followers_count,
            is_active: true,
            connected_by: Some(account.connected_by),
            connected_at: Utc::now(),
            last_sync_at: existing.and_then(|a| a.last_sync_at),
        };
        inner.accounts.insert(saved.id, saved.clone());
        Ok(saved)
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.accounts.get(&id) {
            Some(a) if a.organization_id == organization_id => {
                inner.accounts.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn touch_sync(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<Option<SocialAccount>, AppError> {
        let mut inner = self.inner.lock().unwrap();
        Ok(inner
            .accounts
            .get_mut(&id)
            .filter(|a| a.organization_id == organization_id)
            .map(|a| {
                a.last_sync_at = Some(Utc::now());
                a.clone()
            }))
    }
}

#[async_trait]
impl OAuthStateStore for InMemoryStore {
    async fn create(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        platform: SocialPlatform,
        ttl_secs: i64,
    ) -> Result<OAuthState, AppError> {
        let now = Utc::now();
        let state = OAuthState {
            id: Uuid::new_v4(),
            user_id,
            organization_id,
            platform,
            created_at: now,
            expires_at: now + Duration::seconds(ttl_secs),
        };
        self.insert_state(state.clone());
        Ok(state)
    }

    async fn consume(&self, id: Uuid) -> Result<Option<OAuthState>, AppError> {
        Ok(self.inner.lock().unwrap().states.remove(&id))
    }
}
