use data_encoding::BASE64;

use crate::error::{AuctionError, AuctionResult};

/// Prefix marking a simulated FHE payload.
pub const FHE_PREFIX: &str = "FHE-";

/// Seals plaintext bid payloads.
pub trait Encryptor: Send + Sync {
    fn encrypt(&self, plain: &str) -> AuctionResult<String>;

    fn decrypt(&self, cipher: &str) -> AuctionResult<String>;
}

/// `FHE-` followed by standard padded base64 of the plaintext.
///
/// This is an encoding, not encryption: anyone reading the ledger can
/// recover the plaintext.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedFhe;

impl Encryptor for SimulatedFhe {
    fn encrypt(&self, plain: &str) -> AuctionResult<String> {
        Ok(format!("{FHE_PREFIX}{}", BASE64.encode(plain.as_bytes())))
    }

    fn decrypt(&self, cipher: &str) -> AuctionResult<String> {
        let encoded = cipher
            .strip_prefix(FHE_PREFIX)
            .ok_or_else(|| AuctionError::Crypto("missing FHE- prefix".into()))?;
        let bytes = BASE64
            .decode(encoded.as_bytes())
            .map_err(|e| AuctionError::Crypto(format!("invalid base64: {e}")))?;
        String::from_utf8(bytes)
            .map_err(|e| AuctionError::Crypto(format!("payload is not UTF-8: {e}")))
    }
}
