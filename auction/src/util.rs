//! Utility functions shared across the auction crate.

use crate::error::{AuctionError, AuctionResult};
use serde::de::DeserializeOwned;

pub use crate::config::MAX_LEDGER_VALUE_SIZE;

/// Deserialize UTF-8 JSON with a size limit to prevent oversized payloads.
///
/// Any failure (size, encoding, syntax, missing fields) is reported as
/// `MalformedRecord` so callers can skip the value.
pub fn json_from_limited_slice<T: DeserializeOwned>(
    data: &[u8],
    max_bytes: usize,
) -> AuctionResult<T> {
    if data.len() > max_bytes {
        return Err(AuctionError::MalformedRecord(format!(
            "JSON payload too large: {} bytes (max {})",
            data.len(),
            max_bytes
        )));
    }
    let text = std::str::from_utf8(data)
        .map_err(|e| AuctionError::MalformedRecord(format!("invalid UTF-8: {e}")))?;
    serde_json::from_str(text)
        .map_err(|e| AuctionError::MalformedRecord(format!("JSON deserialization failed: {e}")))
}

/// Serialize a value to UTF-8 JSON bytes.
pub fn json_to_vec<T: serde::Serialize>(value: &T, what: &str) -> AuctionResult<Vec<u8>> {
    serde_json::to_vec(value)
        .map_err(|e| AuctionError::Serialization(format!("Failed to serialize {what}: {e}")))
}
