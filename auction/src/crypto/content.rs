use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};

use super::encryptor::Encryptor;
use crate::error::{AuctionError, AuctionResult};

/// AES-256-GCM key (32 bytes)
pub type ContentKey = [u8; 32];

/// AES-256-GCM nonce (12 bytes)
pub type ContentNonce = [u8; 12];

/// Prefix marking an AES-GCM sealed payload.
pub const AES_PREFIX: &str = "AES-";

/// Generate a random AES-256 key
pub fn generate_key() -> ContentKey {
    Aes256Gcm::generate_key(&mut OsRng).into()
}

/// Seals bids with AES-256-GCM under a key held by the bidder.
///
/// Output is `AES-` followed by hex of `nonce || ciphertext`.
#[derive(Clone)]
pub struct AesGcmEncryptor {
    key: ContentKey,
}

impl AesGcmEncryptor {
    pub const fn new(key: ContentKey) -> Self {
        Self { key }
    }

    /// Encryptor with a freshly generated key.
    pub fn generate() -> Self {
        Self::new(generate_key())
    }
}

impl std::fmt::Debug for AesGcmEncryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesGcmEncryptor").finish_non_exhaustive()
    }
}

impl Encryptor for AesGcmEncryptor {
    fn encrypt(&self, plain: &str) -> AuctionResult<String> {
        let cipher = Aes256Gcm::new((&self.key).into());

        let nonce_bytes: ContentNonce = rand::random();
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plain.as_bytes())
            .map_err(|e| AuctionError::Crypto(format!("Encryption failed: {e}")))?;

        let mut sealed = nonce_bytes.to_vec();
        sealed.extend_from_slice(&ciphertext);
        Ok(format!("{AES_PREFIX}{}", hex::encode(sealed)))
    }

    fn decrypt(&self, cipher_text: &str) -> AuctionResult<String> {
        let encoded = cipher_text
            .strip_prefix(AES_PREFIX)
            .ok_or_else(|| AuctionError::Crypto("missing AES- prefix".into()))?;
        let sealed = hex::decode(encoded)
            .map_err(|e| AuctionError::Crypto(format!("invalid hex: {e}")))?;
        if sealed.len() < 12 {
            return Err(AuctionError::Crypto("sealed bid shorter than nonce".into()));
        }
        let (nonce_bytes, ciphertext) = sealed.split_at(12);

        let cipher = Aes256Gcm::new((&self.key).into());
        let plaintext_bytes = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|e| AuctionError::Crypto(format!("Decryption failed: {e}")))?;

        String::from_utf8(plaintext_bytes)
            .map_err(|_| AuctionError::Crypto("Decrypted content is not valid UTF-8".into()))
    }
}
