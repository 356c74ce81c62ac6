//! Organization Resolver: find or lazily create the caller's organization.

use crate::auth::SessionContext;
use socialhub_core::models::ResolvedOrganization;
use socialhub_core::validation::{
    derive_organization_name, derive_organization_slug, derive_user_name,
};
use socialhub_core::AppError;
use socialhub_db::{OrganizationStore, ProfileStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct OrganizationResolver {
    organizations: Arc<dyn OrganizationStore>,
    profiles: Arc<dyn ProfileStore>,
}

impl OrganizationResolver {
    pub fn new(organizations: Arc<dyn OrganizationStore>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self {
            organizations,
            profiles,
        }
    }

    /// Membership of the session user, creating organization and owner
    /// membership on first use. Concurrent first calls converge on one
    /// organization.
    #[tracing::instrument(skip(self, session), fields(user_id = %session.user_id))]
    pub async fn resolve(&self, session: &SessionContext) -> Result<ResolvedOrganization, AppError> {
        if let Some(existing) = self.organizations.find_for_user(session.user_id).await? {
            return Ok(existing);
        }

        let profile = self
            .profiles
            .ensure(session.user_id, session.email.as_deref())
            .await?;
        let user_name = derive_user_name(Some(&profile), session.email.as_deref());
        let name = derive_organization_name(&user_name);
        let slug = derive_organization_slug(&user_name, session.user_id);

        let resolved = match self
            .organizations
            .create_with_owner(session.user_id, &name, &slug)
            .await
        {
            // Short slug already taken by another user's organization
            Err(AppError::Conflict(_)) => {
                let user_hex = session.user_id.simple().to_string();
                let unique_slug = format!("{}{}", slug, &user_hex[8..]);
                self.organizations
                    .create_with_owner(session.user_id, &name, &unique_slug)
                    .await?
            }
            other => other?,
        };

        if resolved.created {
            tracing::info!(
                organization_id = %resolved.organization.id,
                slug = %resolved.organization.slug,
                "Created organization for new user"
            );
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{session, InMemoryStore};
    use socialhub_core::models::MemberRole;

    fn resolver(store: &Arc<InMemoryStore>) -> OrganizationResolver {
        OrganizationResolver::new(store.clone(), store.clone())
    }

    #[tokio::test]
    async fn test_first_resolve_creates_owner_membership() {
        let store = Arc::new(InMemoryStore::default());
        store.set_profile_name(Some("Ada"), Some("Lovelace"));
        let s = session();

        let resolved = resolver(&store).resolve(&s).await.unwrap();
        assert!(resolved.created);
        assert_eq!(resolved.role, MemberRole::Owner);
        assert_eq!(resolved.organization.name, "Ada Lovelace's Organization");
        let short = &s.user_id.simple().to_string()[..8];
        assert_eq!(
            resolved.organization.slug,
            format!("ada-lovelace-{}", short)
        );
    }

    #[tokio::test]
    async fn test_second_resolve_returns_existing() {
        let store = Arc::new(InMemoryStore::default());
        let s = session();
        let r = resolver(&store);

        let first = r.resolve(&s).await.unwrap();
        let second = r.resolve(&s).await.unwrap();
        assert_eq!(first.organization.id, second.organization.id);
        assert!(!second.created);
        assert_eq!(store.organization_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_resolves_create_one_organization() {
        let store = Arc::new(InMemoryStore::default());
        let s = session();
        let r = resolver(&store);

        let (a, b) = tokio::join!(r.resolve(&s), r.resolve(&s));
        assert_eq!(a.unwrap().organization.id, b.unwrap().organization.id);
        assert_eq!(store.organization_count(), 1);
    }

    #[tokio::test]
    async fn test_slug_collision_retries_with_full_id() {
        let store = Arc::new(InMemoryStore::default());
        let s = session();
        let short = &s.user_id.simple().to_string()[..8];
        store.reserve_slug(&format!("ada-{}", short));

        let resolved = resolver(&store).resolve(&s).await.unwrap();
        assert_eq!(
            resolved.organization.slug,
            format!("ada-{}", s.user_id.simple())
        );
    }
}
