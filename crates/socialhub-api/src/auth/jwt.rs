//! HS256 session token validation

use crate::auth::models::SessionClaims;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use socialhub_core::AppError;

#[derive(Clone)]
pub struct SessionTokenValidator {
    key: DecodingKey,
    validation: Validation,
}

impl SessionTokenValidator {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn validate(&self, token: &str) -> Result<SessionClaims, AppError> {
        let data = decode::<SessionClaims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!("Session token rejected: {}", e);
            match e.kind() {
                ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Session has expired".to_string())
                }
                ErrorKind::ImmatureSignature => {
                    AppError::Unauthorized("Session is not yet valid".to_string())
                }
                _ => AppError::Unauthorized("Invalid session token".to_string()),
            }
        })?;

        Ok(data.claims)
    }
}

/// Sign claims with the shared secret. The identity provider mints real
/// sessions; this exists for local tooling and tests.
pub fn sign_session(claims: &SessionClaims, secret: &str) -> Result<String, AppError> {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign session token: {}", e)))
}
