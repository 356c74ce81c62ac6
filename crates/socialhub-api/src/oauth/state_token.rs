//! Signed OAuth `state` parameter.
//!
//! Payload: nonce (16 bytes), the id of the `oauth_states` record.
//! Token = base64url(payload || HMAC-SHA256(secret, payload)).
//! The signature only proves the nonce was minted here; who started the flow,
//! for which platform, and until when all live in the server-side record.

use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use socialhub_core::{AppError, OAuthErrorKind};
use std::sync::Arc;
use uuid::Uuid;

const PAYLOAD_LEN: usize = 16;
const MAC_LEN: usize = 32;
const TOKEN_LEN: usize = PAYLOAD_LEN + MAC_LEN;

#[derive(Clone)]
pub struct StateSigner {
    secret: Arc<[u8]>,
}

impl std::fmt::Debug for StateSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateSigner").finish_non_exhaustive()
    }
}

impl StateSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            secret: Arc::from(secret.as_bytes()),
        }
    }

    fn mac(&self) -> Result<Hmac<Sha256>, AppError> {
        Hmac::<Sha256>::new_from_slice(&self.secret)
            .map_err(|e| AppError::Internal(format!("Invalid state signing key: {}", e)))
    }

    pub fn sign(&self, nonce: Uuid) -> Result<String, AppError> {
        let mut mac = self.mac()?;
        mac.update(nonce.as_bytes());
        let tag = mac.finalize().into_bytes();

        let mut token = [0u8; TOKEN_LEN];
        token[..PAYLOAD_LEN].copy_from_slice(nonce.as_bytes());
        token[PAYLOAD_LEN..].copy_from_slice(&tag);

        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(token))
    }

    /// Check the signature and return the nonce.
    pub fn verify(&self, state: &str) -> Result<Uuid, AppError> {
        let invalid = || AppError::oauth(OAuthErrorKind::InvalidState, "Invalid OAuth state");

        let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(state.trim())
            .map_err(|_| invalid())?;
        if decoded.len() != TOKEN_LEN {
            return Err(invalid());
        }

        let (payload, tag) = decoded.split_at(PAYLOAD_LEN);
        let mut mac = self.mac()?;
        mac.update(payload);
        mac.verify_slice(tag).map_err(|_| invalid())?;

        Uuid::from_slice(payload).map_err(|_| invalid())
    }
}
