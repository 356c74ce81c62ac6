use socialhub_core::{models::Profile, AppError};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "profiles", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<Postgres, Profile>(
            "SELECT id, email, first_name, last_name, avatar_url FROM profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Make sure a profile row exists for a session user, filling a missing email.
    #[tracing::instrument(skip(self, email), fields(db.table = "profiles", db.operation = "upsert", db.record_id = %id))]
    pub async fn ensure(&self, id: Uuid, email: Option<&str>) -> Result<Profile, AppError> {
        let profile = sqlx::query_as::<Postgres, Profile>(
            r#"
            INSERT INTO profiles (id, email)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET
                email = COALESCE(profiles.email, EXCLUDED.email),
                updated_at = CASE WHEN profiles.email IS NULL THEN NOW() ELSE profiles.updated_at END
            RETURNING id, email, first_name, last_name, avatar_url
            "#,
        )
        .bind(id)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }
}
