//! Provider abstraction and the token endpoint plumbing both platforms share

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use socialhub_core::models::SocialPlatform;
use socialhub_core::{AppError, OAuthErrorKind};

pub const TOKEN_EXCHANGE_FALLBACK: &str = "Failed to exchange code for token";

/// Tokens returned by a successful code exchange
#[derive(Debug, Clone, PartialEq)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Seconds until the access token expires
    pub expires_in: Option<i64>,
}

/// Account profile, already shaped the way it is persisted
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderProfile {
    pub account_id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub profile_picture_url: Option<String>,
    pub followers_count: i32,
}

/// One OAuth platform: authorize URL, code exchange and profile lookup.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    fn platform(&self) -> SocialPlatform;

    /// Both client id and secret are present
    fn is_configured(&self) -> bool;

    fn authorize_url(&self, redirect_uri: &str, state: &str) -> Result<String, AppError>;

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenGrant, AppError>;

    async fn fetch_profile(&self, access_token: &str) -> Result<ProviderProfile, AppError>;
}

pub(crate) fn not_configured(platform: SocialPlatform) -> AppError {
    AppError::oauth(
        OAuthErrorKind::NotConfigured,
        format!("{} is not configured", platform),
    )
}

/// Build `endpoint?client_id&redirect_uri&scope&response_type=code&state`.
pub(crate) fn build_authorize_url(
    endpoint: &str,
    client_id: &str,
    redirect_uri: &str,
    scope: &str,
    state: &str,
) -> Result<String, AppError> {
    let mut url = reqwest::Url::parse(endpoint)
        .map_err(|e| AppError::Internal(format!("Invalid authorize endpoint {}: {}", endpoint, e)))?;
    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("scope", scope)
        .append_pair("response_type", "code")
        .append_pair("state", state);
    Ok(url.into())
}

/// Token endpoint body. Success and every error shape the platforms use
/// (`{error, error_description}`, `{error_type, error_message, code}`,
/// `{error_message}`) deserialize into it.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct TokenEndpointBody {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    /// A string code, or an object `{type, message, code}` on Graph errors
    pub error: Option<Value>,
    pub error_description: Option<String>,
    pub error_type: Option<String>,
    pub error_message: Option<String>,
    pub code: Option<Value>,
}

impl TokenEndpointBody {
    fn has_error(&self) -> bool {
        self.error.is_some() || self.error_type.is_some() || self.error_message.is_some()
    }

    /// Machine code used to classify the failure
    fn error_code(&self) -> Option<String> {
        let from_error = match &self.error {
            Some(Value::String(code)) => Some(code.clone()),
            Some(Value::Object(obj)) => obj
                .get("type")
                .or_else(|| obj.get("code"))
                .map(value_to_code),
            _ => None,
        };
        from_error
            .or_else(|| self.error_type.clone())
            .or_else(|| self.code.as_ref().map(value_to_code))
    }
}

fn value_to_code(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Which field carries the human-readable message on a failed exchange
#[derive(Debug, Clone, Copy)]
pub(crate) enum ErrorMessageField {
    ErrorMessage,
    ErrorDescription,
}

impl ErrorMessageField {
    fn pick<'a>(&self, body: &'a TokenEndpointBody) -> Option<&'a str> {
        let message = match self {
            ErrorMessageField::ErrorMessage => body.error_message.as_deref(),
            ErrorMessageField::ErrorDescription => body.error_description.as_deref(),
        };
        message.map(str::trim).filter(|m| !m.is_empty())
    }
}

/// Classify a failed exchange from its status and body, never from message text.
pub(crate) fn map_token_error(
    status: Option<u16>,
    body: &TokenEndpointBody,
    field: ErrorMessageField,
) -> AppError {
    let code = body.error_code();
    let kind = OAuthErrorKind::from_provider(code.as_deref(), status);
    let message = field.pick(body).unwrap_or(TOKEN_EXCHANGE_FALLBACK);
    AppError::oauth(kind, message)
}

fn transport_error(err: &reqwest::Error, fallback_kind: OAuthErrorKind) -> OAuthErrorKind {
    if err.is_timeout() || err.is_connect() {
        OAuthErrorKind::ProviderUnavailable
    } else {
        fallback_kind
    }
}

/// POST the authorization-code form and interpret the response.
pub(crate) async fn exchange_authorization_code(
    http: &reqwest::Client,
    token_endpoint: &str,
    form: &[(&str, &str)],
    field: ErrorMessageField,
) -> Result<TokenGrant, AppError> {
    let response = http
        .post(token_endpoint)
        .header(reqwest::header::ACCEPT, "application/json")
        .form(form)
        .send()
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, endpoint = %token_endpoint, "Token endpoint request failed");
            AppError::oauth(
                transport_error(&e, OAuthErrorKind::TokenExchangeFailed),
                TOKEN_EXCHANGE_FALLBACK,
            )
        })?;

    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let body: TokenEndpointBody = serde_json::from_str(&text).unwrap_or_default();

    if !status.is_success() || body.has_error() {
        tracing::warn!(status = status.as_u16(), "Token exchange rejected by provider");
        return Err(map_token_error(Some(status.as_u16()), &body, field));
    }

    match body.access_token {
        Some(access_token) if !access_token.is_empty() => Ok(TokenGrant {
            access_token,
            refresh_token: body.refresh_token.filter(|t| !t.is_empty()),
            expires_in: body.expires_in,
        }),
        _ => Err(AppError::oauth(
            OAuthErrorKind::TokenExchangeFailed,
            TOKEN_EXCHANGE_FALLBACK,
        )),
    }
}

/// GET a profile document; any failure is a profile fetch failure.
pub(crate) async fn fetch_profile_json<T: serde::de::DeserializeOwned>(
    request: reqwest::RequestBuilder,
    platform: SocialPlatform,
) -> Result<T, AppError> {
    let failed = |detail: String| {
        tracing::warn!(platform = %platform, detail = %detail, "Profile fetch failed");
        AppError::oauth(
            OAuthErrorKind::ProfileFetchFailed,
            format!("Failed to fetch {} profile", platform),
        )
    };

    let response = request.send().await.map_err(|e| failed(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(failed(format!("status {}", status)));
    }

    response.json::<T>().await.map_err(|e| failed(e.to_string()))
}
