use chrono::{Duration, Utc};
use socialhub_api::auth::{sign_session, SessionClaims};
use uuid::Uuid;

use super::TEST_JWT_SECRET;

/// A signed-in user as the identity provider would hand it to the frontend
#[derive(Debug, Clone)]
pub struct TestUser {
    pub user_id: Uuid,
    pub email: String,
    pub session_id: String,
    pub token: String,
}

pub fn test_user(email: &str) -> TestUser {
    let user_id = Uuid::new_v4();
    let session_id = Uuid::new_v4().to_string();
    let token = token_for(user_id, Some(email), Some(&session_id), Duration::hours(1));
    TestUser {
        user_id,
        email: email.to_string(),
        session_id,
        token,
    }
}

/// Session token with an arbitrary lifetime (negative for expired tokens)
pub fn token_for(
    user_id: Uuid,
    email: Option<&str>,
    session_id: Option<&str>,
    lifetime: Duration,
) -> String {
    let now = Utc::now();
    let claims = SessionClaims {
        sub: user_id,
        email: email.map(String::from),
        exp: (now + lifetime).timestamp(),
        iat: now.timestamp(),
        nbf: None,
        jti: session_id.map(String::from),
    };
    sign_session(&claims, TEST_JWT_SECRET).expect("Failed to sign test session")
}
