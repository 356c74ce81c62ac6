//! Session-protected route groups

use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

fn api(path: &str) -> String {
    format!("{}{}", API_PREFIX, path)
}

pub fn organization_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &api("/organization"),
            get(handlers::organization::get_organization),
        )
        .route(
            &api("/organization/members"),
            get(handlers::members::list_members),
        )
        .route(
            &api("/organization/members/{id}"),
            axum::routing::patch(handlers::members::update_member_role)
                .delete(handlers::members::remove_member),
        )
        .route(
            &api("/organization/invitations"),
            get(handlers::invitations::list_invitations)
                .post(handlers::invitations::create_invitation),
        )
        .route(
            &api("/organization/invitations/{id}"),
            axum::routing::delete(handlers::invitations::delete_invitation),
        )
        .route(
            &api("/invitations/accept"),
            post(handlers::invitations::accept_invitation),
        )
}

pub fn social_account_routes() -> Router<Arc<AppState>> {
    // The connect segment is the platform name; it shares the `{id}` capture
    // because the router rejects two names at one position.
    Router::new()
        .route(
            &api("/social-accounts"),
            get(handlers::social_accounts::list_social_accounts),
        )
        .route(
            &api("/social-accounts/{id}/connect"),
            post(handlers::social_accounts::connect_social_account),
        )
        .route(
            &api("/social-accounts/{id}"),
            axum::routing::delete(handlers::social_accounts::disconnect_social_account),
        )
        .route(
            &api("/social-accounts/{id}/sync"),
            post(handlers::social_accounts::sync_social_account),
        )
}

pub fn post_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &api("/posts"),
            get(handlers::posts::list_posts).post(handlers::posts::create_post),
        )
        .route(
            &api("/posts/{id}"),
            get(handlers::posts::get_post)
                .patch(handlers::posts::update_post)
                .delete(handlers::posts::delete_post),
        )
        .route(
            &api("/posts/{id}/transition"),
            post(handlers::posts::transition_post),
        )
}

pub fn session_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(&api("/session"), get(handlers::session::get_session))
        .route(&api("/session/sign-out"), post(handlers::session::sign_out))
}

/// Provider redirect targets; reached without a session.
pub fn oauth_callback_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/oauth/instagram/callback",
            get(handlers::oauth_callback::instagram_callback),
        )
        .route(
            "/oauth/linkedin/callback",
            get(handlers::oauth_callback::linkedin_callback),
        )
}
