//! Post drafts and their approval/scheduling lifecycle
//!
//! Reads are open to every member; writes require an editing role. Status
//! changes only go through `transition`, which re-checks the status in the
//! same UPDATE so concurrent changes surface as 409.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::OrgContext;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use socialhub_core::models::{
    plan_transition, CreatePostRequest, Post, PostListQuery, PostStatus, TransitionPostRequest,
    UpdatePostRequest,
};
use socialhub_core::validation::{normalize_hashtags, validate_media_urls};
use socialhub_core::AppError;
use socialhub_db::{NewPost, PostEdit};

fn post_not_found() -> AppError {
    AppError::NotFound("Post not found".to_string())
}

fn status_changed() -> AppError {
    AppError::Conflict("Post was modified concurrently, reload and retry".to_string())
}

async fn load_post(state: &AppState, ctx: &OrgContext, id: Uuid) -> Result<Post, AppError> {
    state
        .db
        .post_repository
        .get(ctx.organization_id(), id)
        .await?
        .ok_or_else(post_not_found)
}

/// List posts
#[utoipa::path(
    get,
    path = "/api/v1/posts",
    params(PostListQuery),
    responses(
        (status = 200, description = "Posts ordered by scheduled_for, unscheduled last", body = Vec<Post>)
    ),
    tag = "posts"
)]
#[tracing::instrument(skip(state, ctx), fields(organization_id = %ctx.organization_id()))]
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    ctx: OrgContext,
    Query(query): Query<PostListQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    if let (Some(from), Some(to)) = (query.from, query.to) {
        if from >= to {
            return Err(AppError::InvalidInput("`from` must be before `to`".to_string()).into());
        }
    }

    let posts = state
        .db
        .post_repository
        .list(ctx.organization_id(), &query)
        .await?;
    Ok(Json(posts))
}

/// Create a draft
#[utoipa::path(
    post,
    path = "/api/v1/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Draft created", body = Post),
        (status = 400, description = "Invalid post fields"),
        (status = 403, description = "Viewers cannot create posts")
    ),
    tag = "posts"
)]
#[tracing::instrument(skip(state, ctx, request), fields(organization_id = %ctx.organization_id()))]
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    ctx: OrgContext,
    ValidatedJson(request): ValidatedJson<CreatePostRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_post_editor()?;

    let hashtags = normalize_hashtags(&request.hashtags)?;
    validate_media_urls(&request.media_urls)?;

    let post = state
        .db
        .post_repository
        .create(&NewPost {
            organization_id: ctx.organization_id(),
            title: request.title.trim().to_string(),
            content: request.content,
            content_type: request.content_type,
            hashtags,
            media_urls: request.media_urls,
            metadata: request.metadata.unwrap_or_else(|| serde_json::json!({})),
            platforms: request.platforms,
            generation_type: request.generation_type,
            requires_approval: request.requires_approval,
            scheduled_for: request.scheduled_for,
            created_by: ctx.user_id(),
        })
        .await?;

    tracing::info!(post_id = %post.id, "Post created");
    Ok((StatusCode::CREATED, Json(post)))
}

/// Get a post
#[utoipa::path(
    get,
    path = "/api/v1/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post", body = Post),
        (status = 404, description = "Post not found")
    ),
    tag = "posts"
)]
#[tracing::instrument(skip(state, ctx), fields(organization_id = %ctx.organization_id()))]
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    ctx: OrgContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(load_post(&state, &ctx, id).await?))
}

/// Edit a post in draft, pending_approval or failed
#[utoipa::path(
    patch,
    path = "/api/v1/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated post", body = Post),
        (status = 404, description = "Post not found"),
        (status = 409, description = "Post is not editable in its current status")
    ),
    tag = "posts"
)]
#[tracing::instrument(skip(state, ctx, request), fields(organization_id = %ctx.organization_id()))]
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    ctx: OrgContext,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdatePostRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_post_editor()?;

    let post = load_post(&state, &ctx, id).await?;
    if !post.status.is_editable() {
        return Err(AppError::Conflict(format!(
            "Posts in status {} cannot be edited",
            post.status
        ))
        .into());
    }

    let hashtags = request
        .hashtags
        .as_deref()
        .map(normalize_hashtags)
        .transpose()?;
    if let Some(urls) = request.media_urls.as_deref() {
        validate_media_urls(urls)?;
    }

    let edit = PostEdit {
        title: request.title.map(|t| t.trim().to_string()),
        content: request.content,
        hashtags,
        media_urls: request.media_urls,
        platforms: request.platforms,
        scheduled_for: request.scheduled_for,
    };

    let updated = state
        .db
        .post_repository
        .update(&post, &edit)
        .await?
        .ok_or_else(status_changed)?;
    Ok(Json(updated))
}

/// Delete a post that has not been published
#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 404, description = "Post not found"),
        (status = 409, description = "Published posts cannot be deleted")
    ),
    tag = "posts"
)]
#[tracing::instrument(skip(state, ctx), fields(organization_id = %ctx.organization_id()))]
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    ctx: OrgContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_post_editor()?;

    let post = load_post(&state, &ctx, id).await?;
    if post.status == PostStatus::Published {
        return Err(AppError::Conflict("Published posts cannot be deleted".to_string()).into());
    }

    if !state
        .db
        .post_repository
        .delete(ctx.organization_id(), id)
        .await?
    {
        return Err(status_changed().into());
    }

    tracing::info!(post_id = %id, "Post deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Apply a lifecycle action
#[utoipa::path(
    post,
    path = "/api/v1/posts/{id}/transition",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = TransitionPostRequest,
    responses(
        (status = 200, description = "Post in its new status", body = Post),
        (status = 400, description = "Schedule without a future scheduled_for"),
        (status = 403, description = "Role may not perform this action"),
        (status = 404, description = "Post not found"),
        (status = 409, description = "Action not allowed from the current status")
    ),
    tag = "posts"
)]
#[tracing::instrument(skip(state, ctx, request), fields(organization_id = %ctx.organization_id(), action = ?request.action))]
pub async fn transition_post(
    State(state): State<Arc<AppState>>,
    ctx: OrgContext,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<TransitionPostRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let post = load_post(&state, &ctx, id).await?;

    let transition = plan_transition(
        &post,
        request.action,
        ctx.user_id(),
        ctx.role,
        request.reason,
        Utc::now(),
    )?;

    let updated = state
        .db
        .post_repository
        .apply_transition(ctx.organization_id(), id, &transition)
        .await?
        .ok_or_else(status_changed)?;

    tracing::info!(
        post_id = %id,
        from = %transition.from,
        to = %transition.to,
        "Post status changed"
    );
    Ok(Json(updated))
}
