use socialhub_core::{
    models::{NewSocialAccount, SocialAccount},
    AppError,
};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const ACCOUNT_COLUMNS: &str = r#"id, organization_id, platform, account_id, username, display_name,
    access_token, refresh_token, token_expires_at, profile_picture_url, followers_count,
    is_active, connected_by, connected_at, last_sync_at"#;

/// Repository for connected social accounts. Every query is organization-scoped.
#[derive(Clone)]
pub struct SocialAccountRepository {
    pool: PgPool,
}

impl SocialAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Accounts of an organization, most recently connected first
    #[tracing::instrument(skip(self), fields(db.table = "social_accounts", db.operation = "select"))]
    pub async fn list(&self, organization_id: Uuid) -> Result<Vec<SocialAccount>, AppError> {
        let accounts = sqlx::query_as::<Postgres, SocialAccount>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM social_accounts WHERE organization_id = $1 ORDER BY connected_at DESC"
        ))
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    #[tracing::instrument(skip(self), fields(db.table = "social_accounts", db.operation = "select", db.record_id = %id))]
    pub async fn get(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<Option<SocialAccount>, AppError> {
        let account = sqlx::query_as::<Postgres, SocialAccount>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM social_accounts WHERE id = $1 AND organization_id = $2"
        ))
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// Insert or refresh the account keyed by `(organization_id, platform, account_id)`.
    ///
    /// A reconnect without a refresh token keeps the stored one.
    #[tracing::instrument(
        skip(self, account),
        fields(
            db.table = "social_accounts",
            db.operation = "upsert",
            platform = %account.platform,
            organization_id = %account.organization_id
        )
    )]
    pub async fn upsert(&self, account: &NewSocialAccount) -> Result<SocialAccount, AppError> {
        let saved = sqlx::query_as::<Postgres, SocialAccount>(&format!(
            r#"
            INSERT INTO social_accounts (
                organization_id, platform, account_id, username, display_name,
                access_token, refresh_token, token_expires_at, profile_picture_url,
                followers_count, is_active, connected_by, connected_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, TRUE, $11, NOW())
            ON CONFLICT (organization_id, platform, account_id) DO UPDATE SET
                username = EXCLUDED.username,
                display_name = EXCLUDED.display_name,
                access_token = EXCLUDED.access_token,
                refresh_token = COALESCE(EXCLUDED.refresh_token, social_accounts.refresh_token),
                token_expires_at = EXCLUDED.token_expires_at,
                profile_picture_url = EXCLUDED.profile_picture_url,
                followers_count = EXCLUDED.followers_count,
                is_active = TRUE,
                connected_by = EXCLUDED.connected_by,
                connected_at = NOW()
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(account.organization_id)
        .bind(account.platform)
        .bind(&account.account_id)
        .bind(&account.username)
        .bind(&account.display_name)
        .bind(&account.access_token_encrypted)
        .bind(&account.refresh_token_encrypted)
        .bind(account.token_expires_at)
        .bind(&account.profile_picture_url)
        .bind(account.followers_count)
        .bind(account.connected_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(saved)
    }

    /// Delete one account of the organization. False when no row matched.
    #[tracing::instrument(skip(self), fields(db.table = "social_accounts", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, organization_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result =
            sqlx::query("DELETE FROM social_accounts WHERE id = $1 AND organization_id = $2")
                .bind(id)
                .bind(organization_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Stamp `last_sync_at` with the wall clock; nothing else changes.
    #[tracing::instrument(skip(self), fields(db.table = "social_accounts", db.operation = "update", db.record_id = %id))]
    pub async fn touch_sync(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> Result<Option<SocialAccount>, AppError> {
        let account = sqlx::query_as::<Postgres, SocialAccount>(&format!(
            r#"
            UPDATE social_accounts
            SET last_sync_at = clock_timestamp()
            WHERE id = $1 AND organization_id = $2
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }
}
