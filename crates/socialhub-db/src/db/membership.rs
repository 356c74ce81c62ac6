use socialhub_core::{
    models::{MemberRole, MemberWithProfile, Membership},
    AppError,
};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

#[derive(Clone)]
pub struct MembershipRepository {
    pool: PgPool,
}

impl MembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Members with profile fields, owner first then by join date
    #[tracing::instrument(skip(self), fields(db.table = "organization_members", db.operation = "select"))]
    pub async fn list_with_profiles(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<MemberWithProfile>, AppError> {
        let members = sqlx::query_as::<Postgres, MemberWithProfile>(
            r#"
            SELECT m.id, m.user_id, m.role, m.invited_by, m.joined_at,
                   p.email, p.first_name, p.last_name, p.avatar_url
            FROM organization_members m
            LEFT JOIN profiles p ON p.id = m.user_id
            WHERE m.organization_id = $1
            ORDER BY (m.role = 'owner') DESC, m.joined_at ASC
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }

    #[tracing::instrument(skip(self), fields(db.table = "organization_members", db.operation = "select", db.record_id = %id))]
    pub async fn get(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Membership>, AppError> {
        let member = sqlx::query_as::<Postgres, Membership>(
            r#"
            SELECT id, organization_id, user_id, role, invited_by, joined_at
            FROM organization_members
            WHERE id = $1 AND organization_id = $2
            "#,
        )
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    /// Delete a non-owner member. Returns false when no row matched.
    #[tracing::instrument(skip(self), fields(db.table = "organization_members", db.operation = "delete", db.record_id = %id))]
    pub async fn remove(&self, organization_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM organization_members
            WHERE id = $1 AND organization_id = $2 AND role <> 'owner'
            "#,
        )
        .bind(id)
        .bind(organization_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Change a non-owner member's role
    #[tracing::instrument(skip(self), fields(db.table = "organization_members", db.operation = "update", db.record_id = %id))]
    pub async fn update_role(
        &self,
        organization_id: Uuid,
        id: Uuid,
        role: MemberRole,
    ) -> Result<Option<Membership>, AppError> {
        let member = sqlx::query_as::<Postgres, Membership>(
            r#"
            UPDATE organization_members
            SET role = $3
            WHERE id = $1 AND organization_id = $2 AND role <> 'owner'
            RETURNING id, organization_id, user_id, role, invited_by, joined_at
            "#,
        )
        .bind(id)
        .bind(organization_id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }
}
