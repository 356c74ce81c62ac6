use chrono::{DateTime, Utc};
use socialhub_core::{
    models::{MemberRole, Organization, OrganizationPlan, ResolvedOrganization},
    AppError,
};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::transaction::TransactionGuard;

/// Organization joined with the caller's membership role
#[derive(sqlx::FromRow)]
struct OrganizationRoleRow {
    id: Uuid,
    name: String,
    slug: String,
    plan: OrganizationPlan,
    settings: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    role: MemberRole,
}

impl OrganizationRoleRow {
    fn into_resolved(self, created: bool) -> ResolvedOrganization {
        ResolvedOrganization {
            organization: Organization {
                id: self.id,
                name: self.name,
                slug: self.slug,
                plan: self.plan,
                settings: self.settings,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            role: self.role,
            created,
        }
    }
}

const ORGANIZATION_FOR_USER: &str = r#"
    SELECT o.id, o.name, o.slug, o.plan, o.settings, o.created_at, o.updated_at, m.role
    FROM organization_members m
    JOIN organizations o ON o.id = m.organization_id
    WHERE m.user_id = $1
"#;

#[derive(Clone)]
pub struct OrganizationRepository {
    pool: PgPool,
}

impl OrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Organization and role of the user's membership, if any
    #[tracing::instrument(skip(self), fields(db.table = "organization_members", db.operation = "select"))]
    pub async fn find_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<ResolvedOrganization>, AppError> {
        let row = sqlx::query_as::<Postgres, OrganizationRoleRow>(ORGANIZATION_FOR_USER)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.into_resolved(false)))
    }

    #[tracing::instrument(skip(self), fields(db.table = "organizations", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Organization>, AppError> {
        let org = sqlx::query_as::<Postgres, Organization>(
            "SELECT id, name, slug, plan, settings, created_at, updated_at FROM organizations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(org)
    }

    /// Create an organization with `user_id` as owner unless the user already
    /// has a membership.
    ///
    /// Concurrent calls for one user are serialized by a transaction-scoped
    /// advisory lock; `UNIQUE (user_id)` on memberships backs that up, and a
    /// losing insert rolls back its organization row.
    #[tracing::instrument(skip(self), fields(db.table = "organizations", db.operation = "insert"))]
    pub async fn create_with_owner(
        &self,
        user_id: Uuid,
        name: &str,
        slug: &str,
    ) -> Result<ResolvedOrganization, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1::text))")
            .bind(user_id)
            .execute(tx.conn()?)
            .await?;

        let existing = sqlx::query_as::<Postgres, OrganizationRoleRow>(ORGANIZATION_FOR_USER)
            .bind(user_id)
            .fetch_optional(tx.conn()?)
            .await?;
        if let Some(row) = existing {
            tx.commit().await?;
            return Ok(row.into_resolved(false));
        }

        let org = sqlx::query_as::<Postgres, Organization>(
            r#"
            INSERT INTO organizations (name, slug)
            VALUES ($1, $2)
            ON CONFLICT (slug) DO NOTHING
            RETURNING id, name, slug, plan, settings, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(slug)
        .fetch_optional(tx.conn()?)
        .await?;

        let Some(org) = org else {
            tx.rollback().await?;
            return Err(AppError::Conflict(format!(
                "Organization slug '{}' is already taken",
                slug
            )));
        };

        let inserted = sqlx::query_scalar::<Postgres, Uuid>(
            r#"
            INSERT INTO organization_members (organization_id, user_id, role)
            VALUES ($1, $2, 'owner')
            ON CONFLICT (user_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(org.id)
        .bind(user_id)
        .fetch_optional(tx.conn()?)
        .await?;

        if inserted.is_none() {
            tx.rollback().await?;
            tracing::debug!(user_id = %user_id, "Concurrent resolve created the membership first");
            return self
                .find_for_user(user_id)
                .await?
                .ok_or_else(|| AppError::Internal("Membership vanished during resolve".to_string()));
        }

        tx.commit().await?;

        tracing::info!(
            organization_id = %org.id,
            user_id = %user_id,
            slug = %org.slug,
            "Organization created for new user"
        );

        Ok(ResolvedOrganization {
            organization: org,
            role: MemberRole::Owner,
            created: true,
        })
    }
}
