use chrono::{DateTime, Utc};
use socialhub_core::{
    models::{
        ContentType, GenerationType, Post, PostListQuery, PostStatus, PostTransition,
        SocialPlatform,
    },
    AppError,
};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const POST_COLUMNS: &str = r#"id, organization_id, title, content, content_type, hashtags,
    media_urls, metadata, platforms, status, generation_type, requires_approval, approved_by,
    approved_at, rejection_reason, scheduled_for, published_at, created_by, created_at, updated_at"#;

/// Fields for a new draft
#[derive(Debug, Clone)]
pub struct NewPost {
    pub organization_id: Uuid,
    pub title: String,
    pub content: String,
    pub content_type: ContentType,
    pub hashtags: Vec<String>,
    pub media_urls: Vec<String>,
    pub metadata: serde_json::Value,
    pub platforms: Vec<SocialPlatform>,
    pub generation_type: GenerationType,
    pub requires_approval: bool,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub created_by: Uuid,
}

/// Partial edit; `None` keeps the stored value
#[derive(Debug, Clone, Default)]
pub struct PostEdit {
    pub title: Option<String>,
    pub content: Option<String>,
    pub hashtags: Option<Vec<String>>,
    pub media_urls: Option<Vec<String>>,
    pub platforms: Option<Vec<SocialPlatform>>,
    /// `Some(None)` clears the schedule
    pub scheduled_for: Option<Option<DateTime<Utc>>>,
}

impl PostEdit {
    /// True when the edit changes anything a reviewer approved. Rescheduling
    /// alone keeps the approval.
    pub fn revokes_approval(&self, current: &Post) -> bool {
        fn differs<T: PartialEq>(new: &Option<T>, old: &T) -> bool {
            new.as_ref().is_some_and(|n| n != old)
        }

        differs(&self.title, &current.title)
            || differs(&self.content, &current.content)
            || differs(&self.hashtags, &current.hashtags)
            || differs(&self.media_urls, &current.media_urls)
            || differs(&self.platforms, &current.platforms)
    }
}

#[derive(Clone)]
pub struct PostRepository {
    pool: PgPool,
}

impl PostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Posts ordered by `scheduled_for` (nulls last), then newest first
    #[tracing::instrument(skip(self), fields(db.table = "posts", db.operation = "select"))]
    pub async fn list(
        &self,
        organization_id: Uuid,
        filter: &PostListQuery,
    ) -> Result<Vec<Post>, AppError> {
        let posts = sqlx::query_as::<Postgres, Post>(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE organization_id = $1
              AND ($2::post_status IS NULL OR status = $2)
              AND ($3::timestamptz IS NULL OR scheduled_for >= $3)
              AND ($4::timestamptz IS NULL OR scheduled_for < $4)
            ORDER BY scheduled_for ASC NULLS LAST, created_at DESC
            "#
        ))
        .bind(organization_id)
        .bind(filter.status)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    #[tracing::instrument(skip(self), fields(db.table = "posts", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, organization_id: Uuid, id: Uuid) -> Result<Option<Post>, AppError> {
        let post = sqlx::query_as::<Postgres, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1 AND organization_id = $2"
        ))
        .bind(id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    #[tracing::instrument(skip(self, post), fields(db.table = "posts", db.operation = "insert"))]
    pub async fn create(&self, post: &NewPost) -> Result<Post, AppError> {
        let created = sqlx::query_as::<Postgres, Post>(&format!(
            r#"
            INSERT INTO posts (
                organization_id, title, content, content_type, hashtags, media_urls,
                metadata, platforms, status, generation_type, requires_approval,
                scheduled_for, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'draft', $9, $10, $11, $12)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(post.organization_id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.content_type)
        .bind(&post.hashtags)
        .bind(&post.media_urls)
        .bind(&post.metadata)
        .bind(&post.platforms)
        .bind(post.generation_type)
        .bind(post.requires_approval)
        .bind(post.scheduled_for)
        .bind(post.created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Apply an edit while the post is still in the status it was read in.
    /// Content changes clear any earlier approval.
    ///
    /// Returns `None` when the post is gone or its status changed underneath.
    #[tracing::instrument(skip(self, current, edit), fields(db.table = "posts", db.operation = "update", db.record_id = %current.id))]
    pub async fn update(&self, current: &Post, edit: &PostEdit) -> Result<Option<Post>, AppError> {
        let updated = sqlx::query_as::<Postgres, Post>(&format!(
            r#"
            UPDATE posts SET
                title = COALESCE($4, title),
                content = COALESCE($5, content),
                hashtags = COALESCE($6, hashtags),
                media_urls = COALESCE($7, media_urls),
                platforms = COALESCE($8, platforms),
                scheduled_for = CASE WHEN $9 THEN $10 ELSE scheduled_for END,
                approved_by = CASE WHEN $11 THEN NULL ELSE approved_by END,
                approved_at = CASE WHEN $11 THEN NULL ELSE approved_at END,
                updated_at = NOW()
            WHERE id = $1 AND organization_id = $2 AND status = $3
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(current.id)
        .bind(current.organization_id)
        .bind(current.status)
        .bind(&edit.title)
        .bind(&edit.content)
        .bind(&edit.hashtags)
        .bind(&edit.media_urls)
        .bind(&edit.platforms)
        .bind(edit.scheduled_for.is_some())
        .bind(edit.scheduled_for.flatten())
        .bind(edit.revokes_approval(current))
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Delete unless published. False when no row matched.
    #[tracing::instrument(skip(self), fields(db.table = "posts", db.operation = "delete", db.record_id = %id))]
    pub async fn delete(&self, organization_id: Uuid, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM posts WHERE id = $1 AND organization_id = $2 AND status <> 'published'",
        )
        .bind(id)
        .bind(organization_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Write a planned transition, guarded on the status it was planned from.
    #[tracing::instrument(skip(self, transition), fields(db.table = "posts", db.operation = "update", db.record_id = %id, to = %transition.to))]
    pub async fn apply_transition(
        &self,
        organization_id: Uuid,
        id: Uuid,
        transition: &PostTransition,
    ) -> Result<Option<Post>, AppError> {
        let updated = sqlx::query_as::<Postgres, Post>(&format!(
            r#"
            UPDATE posts SET
                status = $4,
                approved_by = CASE WHEN $5 THEN $6 ELSE approved_by END,
                approved_at = CASE WHEN $5 THEN $7 ELSE approved_at END,
                rejection_reason = CASE WHEN $8 THEN $9 ELSE rejection_reason END,
                published_at = COALESCE($10, published_at),
                updated_at = NOW()
            WHERE id = $1 AND organization_id = $2 AND status = $3
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(organization_id)
        .bind(transition.from)
        .bind(transition.to)
        .bind(transition.set_approval)
        .bind(transition.approved_by)
        .bind(transition.approved_at)
        .bind(transition.set_rejection)
        .bind(&transition.rejection_reason)
        .bind(transition.published_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approved_post() -> Post {
        let now = Utc::now();
        Post {
            id: Uuid::new_v4(),
            organization_id: Uuid::new_v4(),
            title: "Launch".to_string(),
            content: "We shipped".to_string(),
            content_type: ContentType::default(),
            hashtags: vec!["rust".to_string()],
            media_urls: vec![],
            metadata: serde_json::json!({}),
            platforms: vec![SocialPlatform::Linkedin],
            status: PostStatus::Draft,
            generation_type: GenerationType::default(),
            requires_approval: true,
            approved_by: Some(Uuid::new_v4()),
            approved_at: Some(now),
            rejection_reason: None,
            scheduled_for: None,
            published_at: None,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_content_edit_revokes_approval() {
        let post = approved_post();
        let edit = PostEdit {
            content: Some("We shipped, and then some".to_string()),
            ..Default::default()
        };
        assert!(edit.revokes_approval(&post));

        let edit = PostEdit {
            platforms: Some(vec![SocialPlatform::Linkedin, SocialPlatform::Instagram]),
            ..Default::default()
        };
        assert!(edit.revokes_approval(&post));
    }

    #[test]
    fn test_unchanged_fields_and_reschedule_keep_approval() {
        let post = approved_post();
        let edit = PostEdit {
            title: Some("Launch".to_string()),
            hashtags: Some(vec!["rust".to_string()]),
            scheduled_for: Some(Some(Utc::now() + chrono::Duration::days(1))),
            ..Default::default()
        };
        assert!(!edit.revokes_approval(&post));
        assert!(!PostEdit::default().revokes_approval(&post));
    }
}
