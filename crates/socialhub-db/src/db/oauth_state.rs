use socialhub_core::{
    models::{OAuthState, SocialPlatform},
    AppError,
};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

#[derive(Clone)]
pub struct OAuthStateRepository {
    pool: PgPool,
}

impl OAuthStateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a new connect attempt that expires after `ttl_secs`
    #[tracing::instrument(skip(self), fields(db.table = "oauth_states", db.operation = "insert"))]
    pub async fn create(
        &self,
        user_id: Uuid,
        organization_id: Uuid,
        platform: SocialPlatform,
        ttl_secs: i64,
    ) -> Result<OAuthState, AppError> {
        let state = sqlx::query_as::<Postgres, OAuthState>(
            r#"
            INSERT INTO oauth_states (id, user_id, organization_id, platform, expires_at)
            VALUES ($1, $2, $3, $4, NOW() + make_interval(secs => $5))
            RETURNING id, user_id, organization_id, platform, created_at, expires_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(organization_id)
        .bind(platform)
        .bind(ttl_secs as f64)
        .fetch_one(&self.pool)
        .await?;

        Ok(state)
    }

    /// Atomically remove and return the record; a second call gets `None`.
    #[tracing::instrument(skip(self), fields(db.table = "oauth_states", db.operation = "delete", db.record_id = %id))]
    pub async fn consume(&self, id: Uuid) -> Result<Option<OAuthState>, AppError> {
        let state = sqlx::query_as::<Postgres, OAuthState>(
            r#"
            DELETE FROM oauth_states
            WHERE id = $1
            RETURNING id, user_id, organization_id, platform, created_at, expires_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(state)
    }

    #[tracing::instrument(skip(self), fields(db.table = "oauth_states", db.operation = "delete"))]
    pub async fn purge_expired(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM oauth_states WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
