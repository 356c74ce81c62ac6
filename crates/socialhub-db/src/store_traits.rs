//! Repository trait abstractions used by the API services
//!
//! The services hold these as `Arc<dyn Trait>` so they can be exercised
//! against in-memory stores without a database.

use async_trait::async_trait;
use socialhub_core::models::{
    NewSocialAccount, OAuthState, Profile, ResolvedOrganization, SocialAccount, SocialPlatform,
};
use socialhub_core::AppError;
use uuid::Uuid;

use crate::db::{
    OAuthStateRepository, OrganizationRepository, ProfileRepository, SocialAccountRepository,
};

#[async_trait]
pub trait OrganizationStore: Send + Sync {
    async fn find_for_user(&self, user_id: Uuid)
        -> Result<Option<ResolvedOrganization>, AppError>;

    /// Create organization plus owner membership, or return the membership a
    /// concurrent call created first.
    async fn create_with_owner(
        &self,
        user_id: Uuid,
        name: &str,
        slug: &str,
    ) -> Result<ResolvedOrganization, AppError>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn ensure(&self, user_id: Uuid, email: Option<&str>) -> Result<Profile, AppError>;
}

#[async_trait]
pub trait SocialAccountStore: Send + Sync {
    async fn list(&self, organization_id: Uuid) -> Result<Vec<SocialAccount>, AppError>;

    async fn upsert(&self, account: &NewSocialAccount) -> Result<SocialAccount, AppError>;

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> Result<bool, AppError>;

    async fn touch_sync(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<Option<SocialAccount>, AppError>;
}

#[async_trait]
pub trait OAuthStateStore: Send + Sync {
    async fn create(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        platform: SocialPlatform,
        ttl_secs: i64,
    ) -> Result<OAuthState, AppError>;

    /// Remove and return the record; `None` if absent or already consumed.
    async fn consume(&self, id: Uuid) -> Result<Option<OAuthState>, AppError>;
}

// Implementations for concrete repository types

#[async_trait]
impl OrganizationStore for OrganizationRepository {
    async fn find_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<ResolvedOrganization>, AppError> {
        OrganizationRepository::find_for_user(self, user_id).await
    }

    async fn create_with_owner(
        &self,
        user_id: Uuid,
        name: &str,
        slug: &str,
    ) -> Result<ResolvedOrganization, AppError> {
        OrganizationRepository::create_with_owner(self, user_id, name, slug).await
    }
}

#[async_trait]
impl ProfileStore for ProfileRepository {
    async fn ensure(&self, user_id: Uuid, email: Option<&str>) -> Result<Profile, AppError> {
        ProfileRepository::ensure(self, user_id, email).await
    }
}

#[async_trait]
impl SocialAccountStore for SocialAccountRepository {
    async fn list(&self, organization_id: Uuid) -> Result<Vec<SocialAccount>, AppError> {
        SocialAccountRepository::list(self, organization_id).await
    }

    async fn upsert(&self, account: &NewSocialAccount) -> Result<SocialAccount, AppError> {
        SocialAccountRepository::upsert(self, account).await
    }

    async fn delete(&self, organization_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        SocialAccountRepository::delete(self, organization_id, id).await
    }

    async fn touch_sync(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<Option<SocialAccount>, AppError> {
        SocialAccountRepository::touch_sync(self, organization_id, id).await
    }
}

#[async_trait]
impl OAuthStateStore for OAuthStateRepository {
    async fn create(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        platform: SocialPlatform,
        ttl_secs: i64,
    ) -> Result<OAuthState, AppError> {
        OAuthStateRepository::create(self, user_id, organization_id, platform, ttl_secs).await
    }

    async fn consume(&self, id: Uuid) -> Result<Option<OAuthState>, AppError> {
        OAuthStateRepository::consume(self, id).await
    }
}
