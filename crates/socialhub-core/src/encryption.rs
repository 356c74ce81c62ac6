//! At-rest encryption for provider OAuth tokens.

use crate::AppError;
use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose, Engine as _};

const NONCE_LEN: usize = 12;

/// AES-256-GCM cipher for access and refresh tokens.
///
/// Stored form is `base64(nonce || ciphertext)`; every call to `encrypt`
/// draws a fresh nonce, so equal tokens never produce equal rows.
#[derive(Clone)]
pub struct TokenCipher {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for TokenCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TokenCipher(..)")
    }
}

impl TokenCipher {
    /// Build from a raw 32-byte key.
    pub fn from_key_bytes(key_bytes: &[u8]) -> Result<Self, AppError> {
        if key_bytes.len() != 32 {
            return Err(AppError::Encryption(
                "Encryption key must be 32 bytes (256 bits)".to_string(),
            ));
        }
        let key = Key::<Aes256Gcm>::from_slice(key_bytes);
        Ok(Self {
            cipher: Aes256Gcm::new(key),
        })
    }

    /// Build from the base64 form used by `ENCRYPTION_KEY`.
    pub fn from_base64_key(encoded: &str) -> Result<Self, AppError> {
        let key_bytes = general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| AppError::Encryption(format!("Failed to decode encryption key: {}", e)))?;

        Self::from_key_bytes(&key_bytes)
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, AppError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| AppError::Encryption(format!("Encryption failed: {}", e)))?;

        let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        combined.extend_from_slice(&nonce);
        combined.extend_from_slice(&ciphertext);
        Ok(general_purpose::STANDARD.encode(&combined))
    }

    /// Encrypt when a value is present (refresh tokens are optional).
    pub fn encrypt_opt(&self, plaintext: Option<&str>) -> Result<Option<String>, AppError> {
        plaintext.map(|p| self.encrypt(p)).transpose()
    }

    pub fn decrypt(&self, encrypted: &str) -> Result<String, AppError> {
        let combined = general_purpose::STANDARD
            .decode(encrypted)
            .map_err(|e| AppError::Encryption(format!("Failed to decode stored token: {}", e)))?;

        if combined.len() <= NONCE_LEN {
            return Err(AppError::Encryption("Stored token too short".to_string()));
        }

        let (nonce, ciphertext) = combined.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|e| AppError::Encryption(format!("Decryption failed: {}", e)))?;

        String::from_utf8(plaintext)
            .map_err(|e| AppError::Encryption(format!("Invalid UTF-8 in decrypted token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> TokenCipher {
        TokenCipher::from_key_bytes(b"01234567890123456789012345678901").unwrap()
    }

    #[test]
    fn test_token_survives_encryption() {
        let cipher = cipher();
        let stored = cipher.encrypt("tok_x").unwrap();
        assert_ne!(stored, "tok_x");
        assert_eq!(cipher.decrypt(&stored).unwrap(), "tok_x");
    }

    #[test]
    fn test_fresh_nonce_per_encryption() {
        let cipher = cipher();
        assert_ne!(cipher.encrypt("same").unwrap(), cipher.encrypt("same").unwrap());
    }

    #[test]
    fn test_wrong_key_length_rejected() {
        let err = TokenCipher::from_key_bytes(b"too-short").unwrap_err();
        assert!(matches!(err, AppError::Encryption(_)));
    }

    #[test]
    fn test_base64_key() {
        let encoded = general_purpose::STANDARD.encode([7u8; 32]);
        let cipher = TokenCipher::from_base64_key(&encoded).unwrap();
        let stored = cipher.encrypt("refresh").unwrap();
        assert_eq!(cipher.decrypt(&stored).unwrap(), "refresh");

        assert!(TokenCipher::from_base64_key("not base64!!").is_err());
    }

    #[test]
    fn test_tampered_token_fails() {
        let cipher = cipher();
        let stored = cipher.encrypt("tok").unwrap();
        let mut raw = general_purpose::STANDARD.decode(&stored).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0xff;
        let tampered = general_purpose::STANDARD.encode(raw);
        assert!(cipher.decrypt(&tampered).is_err());
    }

    #[test]
    fn test_optional_encrypt() {
        let cipher = cipher();
        assert!(cipher.encrypt_opt(None).unwrap().is_none());
        let stored = cipher.encrypt_opt(Some("r")).unwrap().unwrap();
        assert_eq!(cipher.decrypt(&stored).unwrap(), "r");
    }
}
