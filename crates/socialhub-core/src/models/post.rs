use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::{MemberRole, SocialPlatform};
use crate::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "post_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Draft,
    PendingApproval,
    Scheduled,
    Published,
    Failed,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::PendingApproval => "pending_approval",
            PostStatus::Scheduled => "scheduled",
            PostStatus::Published => "published",
            PostStatus::Failed => "failed",
        }
    }

    pub fn is_editable(&self) -> bool {
        matches!(
            self,
            PostStatus::Draft | PostStatus::PendingApproval | PostStatus::Failed
        )
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "content_type", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Image,
    Video,
    Carousel,
    #[default]
    Text,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "generation_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum GenerationType {
    #[default]
    Manual,
    AiGenerated,
}

/// Lifecycle action requested through `POST /posts/{id}/transition`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PostAction {
    Submit,
    Approve,
    Reject,
    Schedule,
    Unschedule,
    MarkPublished,
    MarkFailed,
    Retry,
}

impl PostAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostAction::Submit => "submit",
            PostAction::Approve => "approve",
            PostAction::Reject => "reject",
            PostAction::Schedule => "schedule",
            PostAction::Unschedule => "unschedule",
            PostAction::MarkPublished => "mark_published",
            PostAction::MarkFailed => "mark_failed",
            PostAction::Retry => "retry",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Post {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub title: String,
    pub content: String,
    pub content_type: ContentType,
    pub hashtags: Vec<String>,
    pub media_urls: Vec<String>,
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
    pub platforms: Vec<SocialPlatform>,
    pub status: PostStatus,
    pub generation_type: GenerationType,
    pub requires_approval: bool,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 10000, message = "content must be 1-10000 characters"))]
    pub content: String,
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub media_urls: Vec<String>,
    #[serde(default)]
    pub platforms: Vec<SocialPlatform>,
    pub scheduled_for: Option<DateTime<Utc>>,
    #[serde(default)]
    pub requires_approval: bool,
    #[serde(default)]
    pub generation_type: GenerationType,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<serde_json::Value>,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 10000, message = "content must be 1-10000 characters"))]
    pub content: Option<String>,
    pub hashtags: Option<Vec<String>>,
    pub media_urls: Option<Vec<String>>,
    pub platforms: Option<Vec<SocialPlatform>>,
    /// Absent keeps the schedule, `null` clears it
    #[serde(default, deserialize_with = "present_or_null")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub scheduled_for: Option<Option<DateTime<Utc>>>,
}

/// Maps a present field to `Some`, so an explicit `null` becomes `Some(None)`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct TransitionPostRequest {
    pub action: PostAction,
    #[validate(length(max = 1000, message = "reason must be at most 1000 characters"))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PostListQuery {
    pub status: Option<PostStatus>,
    /// Lower bound on `scheduled_for` (inclusive)
    pub from: Option<DateTime<Utc>>,
    /// Upper bound on `scheduled_for` (exclusive)
    pub to: Option<DateTime<Utc>>,
}

/// Column changes produced by a valid transition.
#[derive(Debug, Clone, PartialEq)]
pub struct PostTransition {
    pub from: PostStatus,
    pub to: PostStatus,
    /// Overwrite approval columns with `approved_by`/`approved_at`
    pub set_approval: bool,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    /// Overwrite `rejection_reason` with the value below
    pub set_rejection: bool,
    pub rejection_reason: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl PostTransition {
    fn new(from: PostStatus, to: PostStatus) -> Self {
        Self {
            from,
            to,
            set_approval: false,
            approved_by: None,
            approved_at: None,
            set_rejection: false,
            rejection_reason: None,
            published_at: None,
        }
    }
}

/// Validate `action` against the post's current status and the actor's role.
pub fn plan_transition(
    post: &Post,
    action: PostAction,
    actor: Uuid,
    role: MemberRole,
    reason: Option<String>,
    now: DateTime<Utc>,
) -> Result<PostTransition, AppError> {
    if !role.can_edit_posts() {
        return Err(AppError::Forbidden(
            "Viewers cannot change posts".to_string(),
        ));
    }
    if matches!(action, PostAction::Approve | PostAction::Reject) && !role.can_approve_posts() {
        return Err(AppError::Forbidden(
            "Only owners, admins and managers can review posts".to_string(),
        ));
    }

    let from = post.status;
    let invalid = || AppError::InvalidStateTransition {
        from: from.as_str().to_string(),
        action: action.as_str().to_string(),
    };

    let transition = match (from, action) {
        (PostStatus::Draft, PostAction::Submit) => {
            let mut t = PostTransition::new(from, PostStatus::PendingApproval);
            t.set_rejection = true;
            t
        }
        (PostStatus::PendingApproval, PostAction::Approve) => {
            let next = if post.scheduled_for.is_some() {
                PostStatus::Scheduled
            } else {
                PostStatus::Draft
            };
            let mut t = PostTransition::new(from, next);
            t.set_approval = true;
            t.approved_by = Some(actor);
            t.approved_at = Some(now);
            t.set_rejection = true;
            t
        }
        (PostStatus::PendingApproval, PostAction::Reject) => {
            let mut t = PostTransition::new(from, PostStatus::Draft);
            t.set_approval = true;
            t.set_rejection = true;
            t.rejection_reason = reason
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty());
            t
        }
        (PostStatus::Draft, PostAction::Schedule) => {
            match post.scheduled_for {
                Some(at) if at > now => {}
                _ => {
                    return Err(AppError::BadRequest(
                        "scheduled_for must be set to a future time before scheduling".to_string(),
                    ))
                }
            }
            if post.requires_approval && post.approved_at.is_none() {
                return Err(AppError::Conflict(
                    "Post requires approval before it can be scheduled".to_string(),
                ));
            }
            PostTransition::new(from, PostStatus::Scheduled)
        }
        (PostStatus::Scheduled, PostAction::Unschedule) => {
            PostTransition::new(from, PostStatus::Draft)
        }
        (PostStatus::Scheduled, PostAction::MarkPublished) => {
            let mut t = PostTransition::new(from, PostStatus::Published);
            t.published_at = Some(now);
            t
        }
        (PostStatus::Scheduled, PostAction::MarkFailed) => {
            PostTransition::new(from, PostStatus::Failed)
        }
        (PostStatus::Failed, PostAction::Retry) => PostTransition::new(from, PostStatus::Draft),
        _ => return Err(invalid()),
    };

    Ok(transition)
}
