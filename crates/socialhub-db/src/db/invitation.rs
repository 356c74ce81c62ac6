use chrono::{DateTime, Utc};
use socialhub_core::{
    models::{Invitation, MemberRole, Membership},
    AppError,
};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::transaction::{is_unique_violation, TransactionGuard};

const INVITATION_COLUMNS: &str =
    "id, organization_id, email, role, token, invited_by, created_at, expires_at, accepted_at";

#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Unaccepted, unexpired invitations, newest first
    #[tracing::instrument(skip(self), fields(db.table = "invitations", db.operation = "select"))]
    pub async fn list_pending(&self, organization_id: Uuid) -> Result<Vec<Invitation>, AppError> {
        let invitations = sqlx::query_as::<Postgres, Invitation>(&format!(
            r#"
            SELECT {INVITATION_COLUMNS}
            FROM invitations
            WHERE organization_id = $1 AND accepted_at IS NULL AND expires_at > NOW()
            ORDER BY created_at DESC
            "#
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(invitations)
    }

    /// Insert a pending invitation. Expired leftovers for the same email are
    /// cleared first; a live pending one yields `Conflict`.
    #[tracing::instrument(skip(self, token), fields(db.table = "invitations", db.operation = "insert"))]
    pub async fn create(
        &self,
        organization_id: Uuid,
        email: &str,
        role: MemberRole,
        token: &str,
        invited_by: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<Invitation, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        sqlx::query(
            r#"
            DELETE FROM invitations
            WHERE organization_id = $1 AND lower(email) = lower($2)
              AND accepted_at IS NULL AND expires_at <= NOW()
            "#,
        )
        .bind(organization_id)
        .bind(email)
        .execute(tx.conn()?)
        .await?;

        let inserted = sqlx::query_as::<Postgres, Invitation>(&format!(
            r#"
            INSERT INTO invitations (organization_id, email, role, token, invited_by, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {INVITATION_COLUMNS}
            "#
        ))
        .bind(organization_id)
        .bind(email)
        .bind(role)
        .bind(token)
        .bind(invited_by)
        .bind(expires_at)
        .fetch_one(tx.conn()?)
        .await;

        match inserted {
            Ok(invitation) => {
                tx.commit().await?;
                Ok(invitation)
            }
            Err(e) if is_unique_violation(&e) => {
                tx.rollback().await?;
                Err(AppError::Conflict(format!(
                    "An invitation for {} is already pending",
                    email
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Cancel a pending invitation
    #[tracing::instrument(skip(self), fields(db.table = "invitations", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, organization_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM invitations WHERE id = $1 AND organization_id = $2 AND accepted_at IS NULL",
        )
        .bind(id)
        .bind(organization_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self, token), fields(db.table = "invitations", db.operation = "select"))]
    pub async fn find_by_token(&self, token: &str) -> Result<Option<Invitation>, AppError> {
        let invitation = sqlx::query_as::<Postgres, Invitation>(&format!(
            "SELECT {INVITATION_COLUMNS} FROM invitations WHERE token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(invitation)
    }

    /// Mark the invitation accepted and insert the membership in one transaction.
    #[tracing::instrument(skip(self, invitation), fields(db.table = "invitations", db.operation = "update", db.record_id = %invitation.id))]
    pub async fn accept(
        &self,
        invitation: &Invitation,
        user_id: Uuid,
    ) -> Result<Membership, AppError> {
        let mut tx = TransactionGuard::begin(&self.pool).await?;

        let claimed = sqlx::query_scalar::<Postgres, Uuid>(
            r#"
            UPDATE invitations
            SET accepted_at = NOW()
            WHERE id = $1 AND accepted_at IS NULL AND expires_at > NOW()
            RETURNING id
            "#,
        )
        .bind(invitation.id)
        .fetch_optional(tx.conn()?)
        .await?;

        if claimed.is_none() {
            tx.rollback().await?;
            return Err(AppError::Conflict(
                "Invitation is no longer pending".to_string(),
            ));
        }

        let membership = sqlx::query_as::<Postgres, Membership>(
            r#"
            INSERT INTO organization_members (organization_id, user_id, role, invited_by)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO NOTHING
            RETURNING id, organization_id, user_id, role, invited_by, joined_at
            "#,
        )
        .bind(invitation.organization_id)
        .bind(user_id)
        .bind(invitation.role)
        .bind(invitation.invited_by)
        .fetch_optional(tx.conn()?)
        .await?;

        let Some(membership) = membership else {
            tx.rollback().await?;
            return Err(AppError::Conflict(
                "You already belong to an organization".to_string(),
            ));
        };

        tx.commit().await?;
        Ok(membership)
    }
}
