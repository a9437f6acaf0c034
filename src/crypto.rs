//! Decryption of message-bus payloads.
//!
//! The broker delivers bodies as base64 text of `nonce (12 bytes) ‖
//! AES-256-GCM ciphertext`, encrypted with a key shared with this service.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use base64::{Engine, engine::general_purpose::STANDARD};

const NONCE_LEN: usize = 12;

#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("payload is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("ciphertext too short")]
    TooShort,

    #[error("decryption failed")]
    Decryption,
}

/// Shared-key cipher for broker messages.
#[derive(Clone)]
pub struct MessageCipher {
    key: [u8; 32],
}

impl std::fmt::Debug for MessageCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageCipher").finish_non_exhaustive()
    }
}

impl MessageCipher {
    pub fn from_key(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Parse a hex encoded 32 byte key, as found in `MSG_QUEUE_KEY`.
    pub fn from_hex(hex_key: &str) -> Result<Self, CipherError> {
        let bytes = hex::decode(hex_key.trim()).map_err(|e| CipherError::InvalidKey(e.to_string()))?;
        let key: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| CipherError::InvalidKey(format!("expected 32 bytes, got {}", b.len())))?;

        Ok(Self::from_key(key))
    }

    /// Decode and decrypt a broker payload into its plaintext bytes.
    pub fn decrypt(&self, payload: &[u8]) -> Result<Vec<u8>, CipherError> {
        let raw = STANDARD.decode(payload.trim_ascii())?;
        if raw.len() < NONCE_LEN {
            return Err(CipherError::TooShort);
        }

        let cipher = Aes256Gcm::new_from_slice(&self.key)
            .map_err(|e| CipherError::InvalidKey(e.to_string()))?;
        let (nonce, ciphertext) = raw.split_at(NONCE_LEN);

        cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CipherError::Decryption)
    }

    /// Encrypt and encode `plaintext` the way the broker does.
    #[cfg(test)]
    pub fn encrypt(&self, plaintext: &[u8]) -> String {
        let cipher = Aes256Gcm::new_from_slice(&self.key).unwrap();
        let nonce_bytes: [u8; NONCE_LEN] = rand::random();
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
            .unwrap();

        let mut raw = nonce_bytes.to_vec();
        raw.extend_from_slice(&ciphertext);
        STANDARD.encode(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> MessageCipher {
        MessageCipher::from_key([7u8; 32])
    }

    #[test]
    fn decrypts_broker_payload() {
        let payload = cipher().encrypt(br#"{"user_id":"u-1"}"#);
        let plaintext = cipher().decrypt(payload.as_bytes()).unwrap();
        assert_eq!(plaintext, br#"{"user_id":"u-1"}"#);
    }

    #[test]
    fn rejects_payload_encrypted_with_another_key() {
        let payload = MessageCipher::from_key([9u8; 32]).encrypt(b"hello");
        assert!(matches!(
            cipher().decrypt(payload.as_bytes()),
            Err(CipherError::Decryption)
        ));
    }

    #[test]
    fn rejects_plain_json() {
        assert!(matches!(
            cipher().decrypt(br#"{"user_id":"u-1"}"#),
            Err(CipherError::Encoding(_))
        ));
        assert!(matches!(cipher().decrypt(b"AAAA"), Err(CipherError::TooShort)));
    }

    #[test]
    fn parses_hex_keys() {
        assert!(MessageCipher::from_hex(&"ab".repeat(32)).is_ok());
        assert!(matches!(
            MessageCipher::from_hex("abcd"),
            Err(CipherError::InvalidKey(_))
        ));
        assert!(MessageCipher::from_hex("zz").is_err());
    }
}
