//! Organization bootstrap, members and invitations.
//!
//! Run with: `cargo test -p socialhub-api --test organization_test`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use axum::http::StatusCode;
use helpers::auth::test_user;
use helpers::{api_path, setup_test_app};
use serde_json::{json, Value};

#[tokio::test]
async fn test_first_request_creates_organization() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = test_user("ada@example.com");

    let response = client
        .get(&api_path("/organization"))
        .authorization_bearer(&user.token)
        .await;
    response.assert_status_ok();
    let first: Value = response.json();
    assert_eq!(first["role"], "owner");
    assert_eq!(first["can_manage_users"], true);
    assert_eq!(first["organization"]["plan"], "free");
    assert_eq!(first["organization"]["name"], "ada's Organization");
    assert_eq!(
        first["organization"]["slug"],
        format!("ada-{}", &user.user_id.simple().to_string()[..8])
    );

    let second: Value = client
        .get(&api_path("/organization"))
        .authorization_bearer(&user.token)
        .await
        .json();
    assert_eq!(second["organization"]["id"], first["organization"]["id"]);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM organizations")
        .fetch_one(app.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_concurrent_first_requests_create_one_organization() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = test_user("grace@example.com");

    let path = api_path("/organization");
    let request = || async { client.get(&path).authorization_bearer(&user.token).await };
    let (a, b, c) = tokio::join!(request(), request(), request());
    for response in [&a, &b, &c] {
        response.assert_status_ok();
    }
    let ids: Vec<Value> = [a, b, c]
        .iter()
        .map(|r| r.json::<Value>()["organization"]["id"].clone())
        .collect();
    assert!(ids.windows(2).all(|w| w[0] == w[1]));

    let members: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM organization_members")
        .fetch_one(app.pool())
        .await
        .unwrap();
    assert_eq!(members, 1);
}

#[tokio::test]
async fn test_missing_or_invalid_session_is_rejected() {
    let app = setup_test_app().await;
    let client = app.client();

    let response = client.get(&api_path("/organization")).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["code"], "UNAUTHORIZED");

    let response = client
        .get(&api_path("/organization"))
        .authorization_bearer("not-a-jwt")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let expired = helpers::auth::token_for(
        uuid::Uuid::new_v4(),
        Some("late@example.com"),
        None,
        chrono::Duration::minutes(-5),
    );
    client
        .get(&api_path("/organization"))
        .authorization_bearer(&expired)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invitation_flow() {
    let app = setup_test_app().await;
    let client = app.client();
    let owner = test_user("owner@example.com");
    let invitee = test_user("Invitee@Example.com");

    let response = client
        .post(&api_path("/organization/invitations"))
        .authorization_bearer(&owner.token)
        .json(&json!({ "email": "invitee@example.com", "role": "editor" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    let token = created["token"].as_str().unwrap().to_string();
    assert_eq!(token.len(), 64);

    let listed: Value = client
        .get(&api_path("/organization/invitations"))
        .authorization_bearer(&owner.token)
        .await
        .json();
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert!(listed[0].get("token").is_none());

    client
        .post(&api_path("/organization/invitations"))
        .authorization_bearer(&owner.token)
        .json(&json!({ "email": "INVITEE@example.com", "role": "viewer" }))
        .await
        .assert_status(StatusCode::CONFLICT);

    let stranger = test_user("stranger@example.com");
    client
        .post(&api_path("/invitations/accept"))
        .authorization_bearer(&stranger.token)
        .json(&json!({ "token": token }))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let response = client
        .post(&api_path("/invitations/accept"))
        .authorization_bearer(&invitee.token)
        .json(&json!({ "token": token }))
        .await;
    response.assert_status_ok();
    let membership: Value = response.json();
    assert_eq!(membership["role"], "editor");
    assert_eq!(membership["organization_id"], created_org_id(&app, &owner.token).await);

    client
        .post(&api_path("/invitations/accept"))
        .authorization_bearer(&invitee.token)
        .json(&json!({ "token": token }))
        .await
        .assert_status(StatusCode::CONFLICT);

    let members: Value = client
        .get(&api_path("/organization/members"))
        .authorization_bearer(&invitee.token)
        .await
        .json();
    let members = members.as_array().unwrap();
    assert_eq!(members.len(), 2);
    assert_eq!(members[0]["role"], "owner");
    assert_eq!(
        members[1]["email"].as_str().map(str::to_lowercase).as_deref(),
        Some("invitee@example.com")
    );
}

async fn created_org_id(app: &helpers::TestApp, token: &str) -> Value {
    let body: Value = app
        .client()
        .get(&api_path("/organization"))
        .authorization_bearer(token)
        .await
        .json();
    body["organization"]["id"].clone()
}

#[tokio::test]
async fn test_invitation_cannot_grant_owner() {
    let app = setup_test_app().await;
    let owner = test_user("boss@example.com");

    app.client()
        .post(&api_path("/organization/invitations"))
        .authorization_bearer(&owner.token)
        .json(&json!({ "email": "new@example.com", "role": "owner" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    app.client()
        .post(&api_path("/organization/invitations"))
        .authorization_bearer(&owner.token)
        .json(&json!({ "email": "not-an-email", "role": "admin" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_member_management_rules() {
    let app = setup_test_app().await;
    let client = app.client();
    let owner = test_user("lead@example.com");
    let editor = test_user("writer@example.com");

    let invite: Value = client
        .post(&api_path("/organization/invitations"))
        .authorization_bearer(&owner.token)
        .json(&json!({ "email": "writer@example.com", "role": "editor" }))
        .await
        .json();
    let membership: Value = client
        .post(&api_path("/invitations/accept"))
        .authorization_bearer(&editor.token)
        .json(&json!({ "token": invite["token"] }))
        .await
        .json();
    let editor_member_id = membership["id"].as_str().unwrap().to_string();

    let members: Value = client
        .get(&api_path("/organization/members"))
        .authorization_bearer(&owner.token)
        .await
        .json();
    let owner_member_id = members[0]["id"].as_str().unwrap().to_string();

    // Editors cannot manage members
    client
        .delete(&api_path(&format!("/organization/members/{}", owner_member_id)))
        .authorization_bearer(&editor.token)
        .await
        .assert_status(StatusCode::FORBIDDEN);

    // The owner is untouchable, even by the owner
    client
        .delete(&api_path(&format!("/organization/members/{}", owner_member_id)))
        .authorization_bearer(&owner.token)
        .await
        .assert_status(StatusCode::FORBIDDEN);
    client
        .patch(&api_path(&format!("/organization/members/{}", editor_member_id)))
        .authorization_bearer(&owner.token)
        .json(&json!({ "role": "owner" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let updated: Value = client
        .patch(&api_path(&format!("/organization/members/{}", editor_member_id)))
        .authorization_bearer(&owner.token)
        .json(&json!({ "role": "manager" }))
        .await
        .json();
    assert_eq!(updated["role"], "manager");

    client
        .delete(&api_path(&format!("/organization/members/{}", editor_member_id)))
        .authorization_bearer(&owner.token)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    client
        .delete(&api_path(&format!("/organization/members/{}", editor_member_id)))
        .authorization_bearer(&owner.token)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
