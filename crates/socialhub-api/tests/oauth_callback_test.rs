//! End-to-end OAuth connect: authorize URL, provider callback, popup page.
//!
//! Run with: `cargo test -p socialhub-api --test oauth_callback_test`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use helpers::auth::test_user;
use helpers::{api_path, setup_test_app, TestApp};
use mockito::Matcher;
use serde_json::Value;

async fn start_connect(app: &TestApp, token: &str, platform: &str) -> String {
    let body: Value = app
        .client()
        .post(&api_path(&format!("/social-accounts/{}/connect", platform)))
        .authorization_bearer(token)
        .await
        .json();
    let url = reqwest::Url::parse(body["authorize_url"].as_str().unwrap()).unwrap();
    url.query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .unwrap()
}

#[tokio::test]
async fn test_instagram_callback_stores_account() {
    let mut app = setup_test_app().await;
    let user = test_user("ada@example.com");
    let state = start_connect(&app, &user.token, "instagram").await;

    let token_mock = app
        .provider
        .mock("POST", "/oauth/access_token")
        .match_body(Matcher::UrlEncoded("code".into(), "AUTH_CODE".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"IGQVJ_token","user_id":17841400000000000}"#)
        .create_async()
        .await;
    app.provider
        .mock("GET", "/me")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"17841400000000000","username":"acme","account_type":"BUSINESS","media_count":42}"#)
        .create_async()
        .await;

    let response = app
        .client()
        .get("/oauth/instagram/callback")
        .add_query_param("code", "AUTH_CODE")
        .add_query_param("state", &state)
        .await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("INSTAGRAM_SUCCESS"), "{html}");
    assert!(html.contains("window.close()"));
    token_mock.assert_async().await;

    let accounts: Value = app
        .client()
        .get(&api_path("/social-accounts"))
        .authorization_bearer(&user.token)
        .await
        .json();
    let accounts = accounts.as_array().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0]["platform"], "instagram");
    assert_eq!(accounts[0]["username"], "acme");
    assert_eq!(accounts[0]["followers_count"], 42);

    let stored: String = sqlx::query_scalar("SELECT access_token FROM social_accounts")
        .fetch_one(app.pool())
        .await
        .unwrap();
    assert_ne!(stored, "IGQVJ_token");

    // The state record was consumed; replaying the callback fails
    let replay = app
        .client()
        .get("/oauth/instagram/callback")
        .add_query_param("code", "AUTH_CODE")
        .add_query_param("state", &state)
        .await
        .text();
    assert!(replay.contains("INSTAGRAM_ERROR"));
}

#[tokio::test]
async fn test_linkedin_callback_records_refresh_token() {
    let mut app = setup_test_app().await;
    let user = test_user("grace@example.com");
    let state = start_connect(&app, &user.token, "linkedin").await;

    app.provider
        .mock("POST", "/oauth/v2/accessToken")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"AQX","expires_in":5184000,"refresh_token":"AQR"}"#)
        .create_async()
        .await;
    app.provider
        .mock("GET", "/v2/userinfo")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"sub":"li_42","given_name":"Grace","family_name":"Hopper","picture":"https://media.example/g.jpg"}"#)
        .create_async()
        .await;

    let html = app
        .client()
        .get("/oauth/linkedin/callback")
        .add_query_param("code", "LI_CODE")
        .add_query_param("state", &state)
        .await
        .text();
    assert!(html.contains("LINKEDIN_SUCCESS"), "{html}");

    let accounts: Value = app
        .client()
        .get(&api_path("/social-accounts"))
        .authorization_bearer(&user.token)
        .await
        .json();
    assert_eq!(accounts[0]["display_name"], "Grace Hopper");
    assert!(accounts[0]["token_expires_at"].is_string());

    let has_refresh: bool =
        sqlx::query_scalar("SELECT refresh_token IS NOT NULL FROM social_accounts")
            .fetch_one(app.pool())
            .await
            .unwrap();
    assert!(has_refresh);
}

async fn complete_linkedin(app: &TestApp, token: &str, code: &str) {
    let state = start_connect(app, token, "linkedin").await;
    let html = app
        .client()
        .get("/oauth/linkedin/callback")
        .add_query_param("code", code)
        .add_query_param("state", &state)
        .await
        .text();
    assert!(html.contains("LINKEDIN_SUCCESS"), "{html}");
}

#[tokio::test]
async fn test_reconnect_updates_one_row_and_keeps_refresh_token() {
    let mut app = setup_test_app().await;
    let user = test_user("grace@example.com");

    app.provider
        .mock("POST", "/oauth/v2/accessToken")
        .match_body(Matcher::UrlEncoded("code".into(), "FIRST".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"AQX_1","expires_in":5184000,"refresh_token":"AQR_1"}"#)
        .create_async()
        .await;
    app.provider
        .mock("POST", "/oauth/v2/accessToken")
        .match_body(Matcher::UrlEncoded("code".into(), "SECOND".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"AQX_2","expires_in":5184000}"#)
        .create_async()
        .await;
    app.provider
        .mock("GET", "/v2/userinfo")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"sub":"li_42","given_name":"Grace","family_name":"Hopper"}"#)
        .expect(2)
        .create_async()
        .await;

    complete_linkedin(&app, &user.token, "FIRST").await;
    complete_linkedin(&app, &user.token, "SECOND").await;

    let rows: Vec<(String, Option<String>)> = sqlx::query_as(
        "SELECT access_token, refresh_token FROM social_accounts WHERE account_id = 'li_42'",
    )
    .fetch_all(app.pool())
    .await
    .unwrap();
    assert_eq!(rows.len(), 1);

    let cipher = app.cipher();
    let (access, refresh) = &rows[0];
    assert_eq!(cipher.decrypt(access).unwrap(), "AQX_2");
    assert_eq!(cipher.decrypt(refresh.as_deref().unwrap()).unwrap(), "AQR_1");
}

#[tokio::test]
async fn test_callback_state_is_bound_to_platform() {
    let app = setup_test_app().await;
    let user = test_user("ada@example.com");
    let state = start_connect(&app, &user.token, "instagram").await;

    let html = app
        .client()
        .get("/oauth/linkedin/callback")
        .add_query_param("code", "X")
        .add_query_param("state", &state)
        .await
        .text();
    assert!(html.contains("LINKEDIN_ERROR"));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM social_accounts")
        .fetch_one(app.pool())
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_callback_rejects_forged_state_and_missing_code() {
    let app = setup_test_app().await;

    let html = app
        .client()
        .get("/oauth/instagram/callback")
        .add_query_param("code", "X")
        .add_query_param("state", "forged-state")
        .await
        .text();
    assert!(html.contains("INSTAGRAM_ERROR"));

    let html = app
        .client()
        .get("/oauth/instagram/callback")
        .add_query_param("state", "anything")
        .await
        .text();
    assert!(html.contains("No authorization code received"));
}

#[tokio::test]
async fn test_provider_denial_only_closes_popup() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .get("/oauth/linkedin/callback")
        .add_query_param("error", "user_cancelled_login")
        .add_query_param("error_description", "The user cancelled")
        .await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("window.close()"));
    assert!(!html.contains("postMessage"));
}
