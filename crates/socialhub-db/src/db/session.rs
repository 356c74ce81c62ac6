use chrono::{DateTime, Utc};
use socialhub_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Denylist of signed-out session tokens, keyed by JWT `jti`
#[derive(Clone)]
pub struct RevokedSessionRepository {
    pool: PgPool,
}

impl RevokedSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Revoke `jti` until `expires_at`. Revoking twice is a no-op.
    #[tracing::instrument(skip(self, jti), fields(db.table = "revoked_sessions", db.operation = "insert"))]
    pub async fn revoke(
        &self,
        jti: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO revoked_sessions (jti, user_id, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (jti) DO NOTHING
            "#,
        )
        .bind(jti)
        .bind(user_id)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self, jti), fields(db.table = "revoked_sessions", db.operation = "select"))]
    pub async fn is_revoked(&self, jti: &str) -> Result<bool, AppError> {
        let revoked = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS(SELECT 1 FROM revoked_sessions WHERE jti = $1)",
        )
        .bind(jti)
        .fetch_one(&self.pool)
        .await?;

        Ok(revoked)
    }

    #[tracing::instrument(skip(self), fields(db.table = "revoked_sessions", db.operation = "delete"))]
    pub async fn purge_expired(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM revoked_sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
