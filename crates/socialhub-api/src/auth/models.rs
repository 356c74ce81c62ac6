use crate::error::ErrorResponse;
use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Claims of the HS256 session token issued by the identity provider
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid, // user_id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
    pub iat: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
    /// Session id; only tokens carrying one can be revoked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

/// Authenticated session, built by the auth middleware and stored in request extensions
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionContext {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub session_id: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn from_claims(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            session_id: claims.jti,
            expires_at: DateTime::<Utc>::from_timestamp(claims.exp, 0).unwrap_or_else(Utc::now),
        }
    }
}

impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionContext>()
            .cloned()
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorResponse {
                        error: "Missing session context".to_string(),
                        details: None,
                        error_type: None,
                        code: "MISSING_SESSION_CONTEXT".to_string(),
                        recoverable: false,
                        suggested_action: Some("Sign in again".to_string()),
                    }),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_without_optional_fields() {
        let user_id = Uuid::new_v4();
        let claims: SessionClaims = serde_json::from_value(serde_json::json!({
            "sub": user_id,
            "exp": 4_102_444_800i64,
            "iat": 1_700_000_000i64,
        }))
        .unwrap();

        let session = SessionContext::from_claims(claims);
        assert_eq!(session.user_id, user_id);
        assert!(session.email.is_none());
        assert!(session.session_id.is_none());
        assert_eq!(session.expires_at.timestamp(), 4_102_444_800);
    }

    #[tokio::test]
    async fn test_missing_context_is_unauthorized() {
        let request = axum::http::Request::builder().body(()).unwrap();
        let (mut parts, _) = request.into_parts();
        let rejection = SessionContext::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(rejection.0, StatusCode::UNAUTHORIZED);
        assert_eq!(rejection.1.code, "MISSING_SESSION_CONTEXT");
    }
}
