use crate::oauth::provider::{
    build_authorize_url, exchange_authorization_code, fetch_profile_json, not_configured,
    ErrorMessageField, OAuthProvider, ProviderProfile, TokenGrant,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use socialhub_core::models::SocialPlatform;
use socialhub_core::{AppError, OAuthProviderSettings};

pub const LINKEDIN_SCOPE: &str = "r_liteprofile r_emailaddress w_member_social";

const PEOPLE_PROJECTION: &str =
    "(id,localizedFirstName,localizedLastName,profilePicture(displayImage~:playableStreams))";

/// OpenID Connect userinfo document
#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    name: Option<String>,
    given_name: Option<String>,
    family_name: Option<String>,
    picture: Option<String>,
}

/// Legacy `/v2/people/~` document
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyPerson {
    id: String,
    localized_first_name: Option<String>,
    localized_last_name: Option<String>,
    profile_picture: Option<Value>,
}

fn join_name(first: Option<&str>, last: Option<&str>) -> Option<String> {
    let joined = [first, last]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!joined.is_empty()).then_some(joined)
}

impl UserInfo {
    fn into_profile(self) -> ProviderProfile {
        let display_name = join_name(self.given_name.as_deref(), self.family_name.as_deref())
            .or(self.name.filter(|n| !n.trim().is_empty()));
        ProviderProfile {
            username: self.sub.clone(),
            account_id: self.sub,
            display_name,
            profile_picture_url: self.picture,
            followers_count: 0,
        }
    }
}

impl LegacyPerson {
    fn into_profile(self) -> ProviderProfile {
        // displayImage~.elements[0].identifiers[0].identifier
        let picture = self
            .profile_picture
            .as_ref()
            .and_then(|p| p.pointer("/displayImage~/elements/0/identifiers/0/identifier"))
            .and_then(Value::as_str)
            .map(String::from);
        ProviderProfile {
            username: self.id.clone(),
            display_name: join_name(
                self.localized_first_name.as_deref(),
                self.localized_last_name.as_deref(),
            ),
            account_id: self.id,
            profile_picture_url: picture,
            followers_count: 0,
        }
    }
}

pub struct LinkedInProvider {
    http: reqwest::Client,
    settings: OAuthProviderSettings,
}

impl LinkedInProvider {
    pub fn new(http: reqwest::Client, settings: OAuthProviderSettings) -> Self {
        Self { http, settings }
    }

    fn credentials(&self) -> Result<(&str, &str), AppError> {
        self.settings
            .credentials()
            .ok_or_else(|| not_configured(SocialPlatform::Linkedin))
    }
}

#[async_trait]
impl OAuthProvider for LinkedInProvider {
    fn platform(&self) -> SocialPlatform {
        SocialPlatform::Linkedin
    }

    fn is_configured(&self) -> bool {
        self.settings.is_configured()
    }

    fn authorize_url(&self, redirect_uri: &str, state: &str) -> Result<String, AppError> {
        let (client_id, _) = self.credentials()?;
        build_authorize_url(
            &format!("{}/oauth/v2/authorization", self.settings.auth_base_url),
            client_id,
            redirect_uri,
            LINKEDIN_SCOPE,
            state,
        )
    }

    #[tracing::instrument(skip(self, code), fields(platform = "linkedin"))]
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenGrant, AppError> {
        let (client_id, client_secret) = self.credentials()?;
        exchange_authorization_code(
            &self.http,
            &format!("{}/oauth/v2/accessToken", self.settings.auth_base_url),
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ],
            ErrorMessageField::ErrorDescription,
        )
        .await
    }

    /// `/v2/userinfo` first; apps without the OpenID product only get the legacy projection.
    #[tracing::instrument(skip(self, access_token), fields(platform = "linkedin"))]
    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, AppError> {
        let userinfo = self
            .http
            .get(format!("{}/v2/userinfo", self.settings.api_base_url))
            .bearer_auth(access_token);
        match fetch_profile_json::<UserInfo>(userinfo, SocialPlatform::Linkedin).await {
            Ok(info) => return Ok(info.into_profile()),
            Err(e) => tracing::debug!(error = %e, "userinfo unavailable, trying people projection"),
        }

        let people = self
            .http
            .get(format!("{}/v2/people/~", self.settings.api_base_url))
            .query(&[("projection", PEOPLE_PROJECTION)])
            .bearer_auth(access_token);
        let person: LegacyPerson = fetch_profile_json(people, SocialPlatform::Linkedin).await?;
        Ok(person.into_profile())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use socialhub_core::OAuthErrorKind;

    fn provider(server: &mockito::Server) -> LinkedInProvider {
        LinkedInProvider::new(
            reqwest::Client::new(),
            OAuthProviderSettings {
                client_id: Some("li-client".to_string()),
                client_secret: Some("li-secret".to_string()),
                auth_base_url: server.url(),
                api_base_url: server.url(),
            },
        )
    }

    #[tokio::test]
    async fn test_exchange_returns_refresh_and_expiry() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth/v2/accessToken")
            .with_status(200)
            .with_body(r#"{"access_token":"li_tok","expires_in":5184000,"refresh_token":"li_ref"}"#)
            .create_async()
            .await;

        let grant = provider(&server).exchange_code("c", "http://x/cb").await.unwrap();
        assert_eq!(grant.access_token, "li_tok");
        assert_eq!(grant.refresh_token.as_deref(), Some("li_ref"));
        assert_eq!(grant.expires_in, Some(5_184_000));
    }

    #[tokio::test]
    async fn test_exchange_error_description() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/oauth/v2/accessToken")
            .with_status(401)
            .with_body(r#"{"error":"invalid_client","error_description":"Client authentication failed"}"#)
            .create_async()
            .await;

        let err = provider(&server).exchange_code("c", "http://x/cb").await.unwrap_err();
        match err {
            AppError::OAuth { kind, message } => {
                assert_eq!(kind, OAuthErrorKind::InvalidClient);
                assert_eq!(message, "Client authentication failed");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_profile_from_userinfo() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v2/userinfo")
            .match_header("authorization", "Bearer li_tok")
            .with_status(200)
            .with_body(r#"{"sub":"li_42","given_name":"Ada","family_name":"Lovelace","picture":"https://media.example/ada.jpg"}"#)
            .create_async()
            .await;

        let profile = provider(&server).fetch_profile("li_tok").await.unwrap();
        assert_eq!(profile.account_id, "li_42");
        assert_eq!(profile.username, "li_42");
        assert_eq!(profile.display_name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(profile.profile_picture_url.as_deref(), Some("https://media.example/ada.jpg"));
    }

    #[tokio::test]
    async fn test_profile_falls_back_to_people() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v2/userinfo")
            .with_status(403)
            .create_async()
            .await;
        server
            .mock("GET", "/v2/people/~")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"id":"abc","localizedFirstName":"Grace","localizedLastName":"Hopper",
                    "profilePicture":{"displayImage~":{"elements":[{"identifiers":[{"identifier":"https://media.example/g.jpg"}]}]}}}"#,
            )
            .create_async()
            .await;

        let profile = provider(&server).fetch_profile("li_tok").await.unwrap();
        assert_eq!(profile.account_id, "abc");
        assert_eq!(profile.display_name.as_deref(), Some("Grace Hopper"));
        assert_eq!(profile.profile_picture_url.as_deref(), Some("https://media.example/g.jpg"));
    }

    #[tokio::test]
    async fn test_profile_failure_is_typed() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/v2/userinfo").with_status(500).create_async().await;
        server
            .mock("GET", "/v2/people/~")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let err = provider(&server).fetch_profile("li_tok").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::OAuth {
                kind: OAuthErrorKind::ProfileFetchFailed,
                ..
            }
        ));
    }
}
