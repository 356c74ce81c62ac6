//! Invitation token minting and acceptance checks

use chrono::{DateTime, Utc};
use rand::RngCore;
use socialhub_core::models::Invitation;
use socialhub_core::validation::normalize_email;
use socialhub_core::AppError;

const TOKEN_BYTES: usize = 32;

/// 256 random bits, hex encoded
pub fn generate_invitation_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// An invitation may be accepted while pending, and only by the invited address.
pub fn check_acceptable(
    invitation: &Invitation,
    session_email: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if !invitation.is_pending(now) {
        return Err(AppError::Conflict(
            "Invitation has expired or was already accepted".to_string(),
        ));
    }

    let matches = session_email
        .map(|email| normalize_email(email) == normalize_email(&invitation.email))
        .unwrap_or(false);
    if !matches {
        return Err(AppError::Forbidden(
            "This invitation was sent to a different email address".to_string(),
        ));
    }

    Ok(())
}
