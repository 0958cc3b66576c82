//! Encryption-at-rest for session tokens.
//!
//! AES-256-GCM with a single process-wide key loaded at startup. Ciphertexts
//! are laid out as `nonce (12 bytes) || ciphertext || tag (16 bytes)` and
//! hex-encoded for storage. The authenticated tag means decrypting under the
//! wrong key fails cleanly instead of producing garbage.

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid ciphertext format: {0}")]
    InvalidFormat(String),

    #[error("encryption failed")]
    Encryption,

    /// Wrong key, tampered data, or corrupted storage.
    #[error("decryption failed")]
    Decryption,
}

/// Holds the process-wide symmetric key. Constructed once from configuration
/// and shared immutably; the raw key is never exposed or logged.
#[derive(Clone)]
pub struct TokenVault {
    cipher: Aes256Gcm,
}

impl TokenVault {
    /// Build a vault from a 64-char hex key (32 bytes).
    pub fn from_hex_key(hex_key: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(hex_key.trim())
            .map_err(|e| CryptoError::InvalidKey(format!("key is not valid hex: {e}")))?;
        Self::from_key_bytes(&bytes)
    }

    pub fn from_key_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != KEY_LEN {
            return Err(CryptoError::InvalidKey(format!(
                "key must be {} bytes, got {}",
                KEY_LEN,
                bytes.len()
            )));
        }
        let cipher =
            Aes256Gcm::new_from_slice(bytes).map_err(|_| CryptoError::InvalidKey("bad key".into()))?;
        Ok(Self { cipher })
    }

    /// Encrypt a token, returning the hex-encoded `nonce || ciphertext || tag`.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let sealed = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::Encryption)?;

        let mut out = nonce.to_vec();
        out.extend_from_slice(&sealed);
        Ok(hex::encode(out))
    }

    /// Decrypt a hex-encoded `nonce || ciphertext || tag` back into the token.
    pub fn decrypt(&self, encoded: &str) -> Result<String, CryptoError> {
        let raw = hex::decode(encoded.trim())
            .map_err(|e| CryptoError::InvalidFormat(format!("not valid hex: {e}")))?;

        if raw.len() < NONCE_LEN + TAG_LEN {
            return Err(CryptoError::InvalidFormat(format!(
                "ciphertext too short: expected at least {} bytes, got {}",
                NONCE_LEN + TAG_LEN,
                raw.len()
            )));
        }

        let nonce = Nonce::from_slice(&raw[..NONCE_LEN]);
        let plaintext = self
            .cipher
            .decrypt(nonce, &raw[NONCE_LEN..])
            .map_err(|_| CryptoError::Decryption)?;

        String::from_utf8(plaintext).map_err(|_| CryptoError::Decryption)
    }
}
