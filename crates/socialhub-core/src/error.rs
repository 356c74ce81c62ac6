//! Error types module
//!
//! All errors are unified under the `AppError` enum. Each variant describes its own
//! HTTP presentation through the `ErrorMetadata` trait so the API layer never has to
//! inspect error text.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues and provider failures
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "DATABASE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Typed classification of OAuth connect/callback failures.
///
/// Derived from the provider's machine-readable error fields and HTTP status,
/// never from free-form message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthErrorKind {
    /// The user declined the consent screen
    AccessDenied,
    /// Callback arrived without `code` and without `error`
    MissingCode,
    /// `state` failed signature verification or has no server-side record
    InvalidState,
    /// `state` record exists but its TTL elapsed
    ExpiredState,
    /// `state` was issued for a different platform than the callback route
    PlatformMismatch,
    /// Authorization code expired, was already used, or redirect_uri mismatch
    InvalidGrant,
    /// Client id/secret rejected by the provider
    InvalidClient,
    /// Provider throttled the request
    RateLimited,
    /// Token endpoint failed for any other reason
    TokenExchangeFailed,
    /// Profile endpoint failed after a successful exchange
    ProfileFetchFailed,
    /// Network failure or provider 5xx
    ProviderUnavailable,
    /// Platform client credentials are not configured on this server
    NotConfigured,
}

impl OAuthErrorKind {
    /// Map a provider error code (`error`, `error_type` or `code` field) and
    /// HTTP status to a kind.
    pub fn from_provider(code: Option<&str>, status: Option<u16>) -> Self {
        let normalized = code.map(|c| c.trim().to_ascii_lowercase());
        match normalized.as_deref() {
            Some("access_denied") | Some("user_denied") | Some("user_cancelled_login")
            | Some("user_cancelled_authorize") => return OAuthErrorKind::AccessDenied,
            Some("invalid_grant") | Some("invalid_code") | Some("authorization_code_expired") => {
                return OAuthErrorKind::InvalidGrant
            }
            Some("invalid_client") | Some("unauthorized_client")
            | Some("invalid_client_id") | Some("invalid_client_secret") => {
                return OAuthErrorKind::InvalidClient
            }
            Some("oauthratelimitexception") | Some("rate_limit_exceeded")
            | Some("too_many_requests") => return OAuthErrorKind::RateLimited,
            Some("temporarily_unavailable") | Some("server_error") => {
                return OAuthErrorKind::ProviderUnavailable
            }
            _ => {}
        }

        match status {
            Some(401) => OAuthErrorKind::InvalidClient,
            Some(429) => OAuthErrorKind::RateLimited,
            Some(s) if s >= 500 => OAuthErrorKind::ProviderUnavailable,
            _ => OAuthErrorKind::TokenExchangeFailed,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            OAuthErrorKind::AccessDenied => "OAUTH_ACCESS_DENIED",
            OAuthErrorKind::MissingCode => "OAUTH_MISSING_CODE",
            OAuthErrorKind::InvalidState => "OAUTH_INVALID_STATE",
            OAuthErrorKind::ExpiredState => "OAUTH_EXPIRED_STATE",
            OAuthErrorKind::PlatformMismatch => "OAUTH_PLATFORM_MISMATCH",
            OAuthErrorKind::InvalidGrant => "OAUTH_INVALID_GRANT",
            OAuthErrorKind::InvalidClient => "OAUTH_INVALID_CLIENT",
            OAuthErrorKind::RateLimited => "OAUTH_RATE_LIMITED",
            OAuthErrorKind::TokenExchangeFailed => "OAUTH_TOKEN_EXCHANGE_FAILED",
            OAuthErrorKind::ProfileFetchFailed => "OAUTH_PROFILE_FETCH_FAILED",
            OAuthErrorKind::ProviderUnavailable => "OAUTH_PROVIDER_UNAVAILABLE",
            OAuthErrorKind::NotConfigured => "OAUTH_NOT_CONFIGURED",
        }
    }

    /// User-facing guidance for the connect dialog
    pub fn guidance(&self) -> &'static str {
        match self {
            OAuthErrorKind::AccessDenied => "Authorization was cancelled. Try connecting again.",
            OAuthErrorKind::MissingCode => "No authorization code received",
            OAuthErrorKind::InvalidState | OAuthErrorKind::ExpiredState => {
                "The connect session expired. Start the connection again from the dashboard."
            }
            OAuthErrorKind::PlatformMismatch => {
                "The connect session belongs to another platform. Start the connection again."
            }
            OAuthErrorKind::InvalidGrant => {
                "The authorization code is no longer valid. Start the connection again."
            }
            OAuthErrorKind::InvalidClient | OAuthErrorKind::NotConfigured => {
                "This platform integration is misconfigured. Contact your administrator."
            }
            OAuthErrorKind::RateLimited => "The platform is throttling requests. Wait a minute and retry.",
            OAuthErrorKind::TokenExchangeFailed => "Failed to exchange code for token",
            OAuthErrorKind::ProfileFetchFailed => {
                "The account profile could not be read, so nothing was connected. Try again."
            }
            OAuthErrorKind::ProviderUnavailable => "The platform is unavailable. Retry later.",
        }
    }

    /// Whether the whole flow may simply be retried by the user
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            OAuthErrorKind::RateLimited
                | OAuthErrorKind::ProviderUnavailable
                | OAuthErrorKind::ExpiredState
                | OAuthErrorKind::InvalidGrant
        )
    }
}

impl Display for OAuthErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.code())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid state transition: {action} is not allowed from {from}")]
    InvalidStateTransition { from: String, action: String },

    #[error("OAuth error ({kind}): {message}")]
    OAuth {
        kind: OAuthErrorKind,
        message: String,
    },

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Shorthand for an OAuth failure that carries the provider's message
    pub fn oauth(kind: OAuthErrorKind, message: impl Into<String>) -> Self {
        AppError::OAuth {
            kind,
            message: message.into(),
        }
    }
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("UUID parsing error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::Database(_) => (
            500,
            "DATABASE_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::BadRequest(_) => (
            400,
            "BAD_REQUEST",
            false,
            Some("Check request format and parameters"),
            false,
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            404,
            "NOT_FOUND",
            false,
            Some("Verify the resource ID exists"),
            false,
            LogLevel::Debug,
        ),
        AppError::Unauthorized(_) => (
            401,
            "UNAUTHORIZED",
            false,
            Some("Sign in again to obtain a fresh session token"),
            false,
            LogLevel::Debug,
        ),
        AppError::Forbidden(_) => (
            403,
            "FORBIDDEN",
            false,
            Some("Ask an organization owner or admin for access"),
            false,
            LogLevel::Debug,
        ),
        AppError::Conflict(_) => (
            409,
            "CONFLICT",
            false,
            Some("Reload the resource and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::InvalidStateTransition { .. } => (
            409,
            "INVALID_STATE_TRANSITION",
            false,
            Some("Reload the post to see its current status"),
            false,
            LogLevel::Debug,
        ),
        AppError::OAuth { kind, .. } => {
            let status = match kind {
                OAuthErrorKind::NotConfigured => 400,
                OAuthErrorKind::RateLimited => 429,
                OAuthErrorKind::ProviderUnavailable => 503,
                OAuthErrorKind::TokenExchangeFailed
                | OAuthErrorKind::ProfileFetchFailed
                | OAuthErrorKind::InvalidClient => 502,
                _ => 400,
            };
            (
                status,
                kind.code(),
                kind.is_retryable(),
                Some(kind.guidance()),
                false,
                LogLevel::Warn,
            )
        }
        AppError::Encryption(_) => (
            500,
            "ENCRYPTION_ERROR",
            false,
            Some("Contact support if this error persists"),
            true,
            LogLevel::Error,
        ),
        AppError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::BadRequest(_) => "BadRequest",
            AppError::NotFound(_) => "NotFound",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Forbidden(_) => "Forbidden",
            AppError::Conflict(_) => "Conflict",
            AppError::InvalidStateTransition { .. } => "InvalidStateTransition",
            AppError::OAuth { .. } => "OAuth",
            AppError::Encryption(_) => "Encryption",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::BadRequest(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Unauthorized(ref msg) => msg.clone(),
            AppError::Forbidden(ref msg) => msg.clone(),
            AppError::Conflict(ref msg) => msg.clone(),
            AppError::InvalidStateTransition { from, action } => {
                format!("Cannot {} a post that is {}", action, from)
            }
            AppError::OAuth { ref message, .. } => message.clone(),
            AppError::Encryption(_) => "Failed to process stored credentials".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_database() {
        #[cfg(feature = "sqlx")]
        let err = AppError::from(sqlx::Error::PoolClosed);
        #[cfg(not(feature = "sqlx"))]
        let err = AppError::Database("pool closed".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Failed to access database");
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_not_found() {
        let err = AppError::NotFound("Social account not found".to_string());
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "Social account not found");
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_forbidden_and_conflict() {
        let forbidden = AppError::Forbidden("Only owners and admins can manage members".into());
        assert_eq!(forbidden.http_status_code(), 403);
        assert_eq!(forbidden.error_code(), "FORBIDDEN");

        let conflict = AppError::Conflict("Invitation already pending".into());
        assert_eq!(conflict.http_status_code(), 409);
        assert_eq!(conflict.error_code(), "CONFLICT");
    }

    #[test]
    fn test_invalid_state_transition_message() {
        let err = AppError::InvalidStateTransition {
            from: "published".to_string(),
            action: "submit".to_string(),
        };
        assert_eq!(err.http_status_code(), 409);
        assert_eq!(err.error_code(), "INVALID_STATE_TRANSITION");
        assert_eq!(err.client_message(), "Cannot submit a post that is published");
    }

    #[test]
    fn test_oauth_error_uses_kind_code_and_provider_message() {
        let err = AppError::oauth(OAuthErrorKind::InvalidGrant, "Invalid authorization code");
        assert_eq!(err.error_code(), "OAUTH_INVALID_GRANT");
        assert_eq!(err.http_status_code(), 400);
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Invalid authorization code");
        assert_eq!(err.log_level(), LogLevel::Warn);

        let unavailable = AppError::oauth(OAuthErrorKind::ProviderUnavailable, "boom");
        assert_eq!(unavailable.http_status_code(), 503);
    }

    #[test]
    fn test_oauth_suggested_action_follows_kind() {
        let expired = AppError::oauth(OAuthErrorKind::ExpiredState, "State expired");
        assert_eq!(
            expired.suggested_action(),
            Some(OAuthErrorKind::ExpiredState.guidance())
        );

        let misconfigured = AppError::oauth(OAuthErrorKind::NotConfigured, "Missing client id");
        assert_eq!(
            misconfigured.suggested_action(),
            Some("This platform integration is misconfigured. Contact your administrator.")
        );
        assert_ne!(expired.suggested_action(), misconfigured.suggested_action());

        let profile = OAuthErrorKind::ProfileFetchFailed.guidance();
        assert!(profile.contains("nothing was connected"));
    }

    #[test]
    fn test_oauth_kind_from_provider_codes() {
        assert_eq!(
            OAuthErrorKind::from_provider(Some("invalid_grant"), Some(400)),
            OAuthErrorKind::InvalidGrant
        );
        assert_eq!(
            OAuthErrorKind::from_provider(Some("OAuthRateLimitException"), Some(400)),
            OAuthErrorKind::RateLimited
        );
        assert_eq!(
            OAuthErrorKind::from_provider(Some("access_denied"), None),
            OAuthErrorKind::AccessDenied
        );
        assert_eq!(
            OAuthErrorKind::from_provider(Some("invalid_client"), Some(401)),
            OAuthErrorKind::InvalidClient
        );
    }

    #[test]
    fn test_oauth_kind_falls_back_to_status() {
        assert_eq!(
            OAuthErrorKind::from_provider(None, Some(503)),
            OAuthErrorKind::ProviderUnavailable
        );
        assert_eq!(
            OAuthErrorKind::from_provider(None, Some(429)),
            OAuthErrorKind::RateLimited
        );
        assert_eq!(
            OAuthErrorKind::from_provider(Some("OAuthException"), Some(400)),
            OAuthErrorKind::TokenExchangeFailed
        );
    }

    #[test]
    fn test_error_metadata_suggested_actions() {
        let err = AppError::NotFound("test".to_string());
        assert_eq!(err.suggested_action(), Some("Verify the resource ID exists"));

        let err = AppError::InvalidInput("test".to_string());
        assert_eq!(
            err.suggested_action(),
            Some("Check request parameters and try again")
        );
    }
}
