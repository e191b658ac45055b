//! Key-value ledger abstraction for the auction's contract storage.

use anyhow::Result;
use async_trait::async_trait;

/// A value read from the ledger together with its write version.
///
/// Absent keys read as empty data at version 0. Every write to a key
/// increments its version by one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerEntry {
    pub data: Vec<u8>,
    pub version: u64,
}

impl LedgerEntry {
    /// Whether the key held no value.
    pub fn is_absent(&self) -> bool {
        self.data.is_empty()
    }
}

/// Receipt returned by a committed write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    /// Transaction hash (hex).
    pub tx_hash: String,
    /// Version of the key after this write.
    pub version: u64,
}

/// Abstraction over the generic key-value contract.
///
/// This trait enables testing of ledger-dependent code without a deployed
/// contract or a signer.
#[async_trait]
pub trait Ledger: Send + Sync + Clone {
    /// Whether the contract is reachable and accepting calls.
    async fn is_available(&self) -> Result<bool>;

    /// Read the raw value and version stored under `key`.
    async fn get_entry(&self, key: &str) -> Result<LedgerEntry>;

    /// Read the raw value stored under `key`. Empty means absent.
    async fn get_data(&self, key: &str) -> Result<Vec<u8>> {
        Ok(self.get_entry(key).await?.data)
    }

    /// Unconditionally overwrite the value stored under `key`.
    async fn set_data(&self, key: &str, value: Vec<u8>) -> Result<TxReceipt>;

    /// Write `value` only if `key` is still at `expected_version`.
    ///
    /// Returns `None` when another writer got there first.
    async fn compare_and_set(
        &self,
        key: &str,
        expected_version: u64,
        value: Vec<u8>,
    ) -> Result<Option<TxReceipt>>;
}
