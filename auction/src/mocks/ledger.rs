//! Mock key-value ledger for testing.

use crate::traits::{Ledger, LedgerEntry, TxReceipt};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Create a deterministic checksummed-looking wallet address for tests.
pub fn make_test_address(id: u8) -> String {
    format!("0x{:0>40}", format!("{id:02X}Ab"))
}

/// Types of failures that can be simulated.
#[derive(Debug, Clone)]
pub enum MockLedgerFailure {
    /// Fail all operations.
    All,
    /// Fail only read operations.
    Reads,
    /// Fail only write operations.
    Writes,
    /// Fail reads and writes on a specific key.
    OnKey(String),
    /// Fail only writes on a specific key.
    WritesOnKey(String),
}

#[derive(Debug, Default)]
struct MockLedgerInner {
    /// Storage for all keys: Map<key, entry>
    storage: RwLock<HashMap<String, LedgerEntry>>,
    /// Writes applied right after the next read of a key.
    staged: RwLock<HashMap<String, Vec<Vec<u8>>>>,
    /// Set when the contract should report itself unavailable.
    unavailable: AtomicBool,
    /// Whether to simulate failures.
    fail_mode: RwLock<Option<MockLedgerFailure>>,
    /// Committed writes, in order: (writer, key).
    write_log: RwLock<Vec<(String, String)>>,
    /// Counter mixed into transaction hashes.
    tx_counter: AtomicU64,
}

/// Mock ledger for testing.
///
/// Simulates a contract where all parties sharing the same underlying
/// `SharedLedgerHandle` see the same state. Each `MockLedger` carries the
/// account of the party using this view, recorded in the write log.
///
/// For single-party unit tests, use `MockLedger::new()`.
/// For multi-party integration tests, use `SharedLedgerHandle` to create views.
#[derive(Debug, Clone)]
pub struct MockLedger {
    inner: Arc<MockLedgerInner>,
    account: String,
}

/// Handle to shared ledger storage for creating party views.
#[derive(Debug, Clone, Default)]
pub struct SharedLedgerHandle {
    inner: Arc<MockLedgerInner>,
}

impl SharedLedgerHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a view of the shared ledger for a specific party.
    pub fn create_party_view(&self, account: impl Into<String>) -> MockLedger {
        MockLedger {
            inner: self.inner.clone(),
            account: account.into(),
        }
    }
}

impl MockLedger {
    /// Create a new single-party mock ledger.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MockLedgerInner::default()),
            account: make_test_address(0),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    /// Set failure mode for testing error handling.
    pub async fn set_fail_mode(&self, mode: Option<MockLedgerFailure>) {
        *self.inner.fail_mode.write().await = mode;
    }

    /// Make `is_available` report false (or true again).
    pub fn set_available(&self, available: bool) {
        self.inner.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Queue a write by "another client" that lands right after the next
    /// read of `key`, so the reader acts on a stale value.
    pub async fn stage_concurrent_write(&self, key: &str, value: Vec<u8>) {
        self.inner
            .staged
            .write()
            .await
            .entry(key.to_string())
            .or_default()
            .push(value);
    }

    /// Seed a value directly, bypassing failure modes and the write log.
    pub async fn seed(&self, key: &str, value: Vec<u8>) {
        let mut storage = self.inner.storage.write().await;
        let entry = storage.entry(key.to_string()).or_default();
        entry.data = value;
        entry.version += 1;
    }

    /// Check if current operation should fail.
    async fn should_fail(&self, is_write: bool, key: &str) -> bool {
        let mode = self.inner.fail_mode.read().await;
        match &*mode {
            None => false,
            Some(MockLedgerFailure::All) => true,
            Some(MockLedgerFailure::Reads) => !is_write,
            Some(MockLedgerFailure::Writes) => is_write,
            Some(MockLedgerFailure::OnKey(k)) => key == k,
            Some(MockLedgerFailure::WritesOnKey(k)) => is_write && key == k,
        }
    }

    fn receipt(&self, key: &str, value: &[u8], version: u64) -> TxReceipt {
        let nonce = self.inner.tx_counter.fetch_add(1, Ordering::SeqCst);
        let mut hasher = Sha256::new();
        hasher.update(self.account.as_bytes());
        hasher.update(key.as_bytes());
        hasher.update(value);
        hasher.update(version.to_le_bytes());
        hasher.update(nonce.to_le_bytes());
        TxReceipt {
            tx_hash: format!("0x{}", hex::encode(hasher.finalize())),
            version,
        }
    }

    /// Write `value` if the stored version equals `expected`, or always
    /// when `expected` is `None`. Check and write happen under one lock.
    async fn commit(
        &self,
        key: &str,
        value: Vec<u8>,
        expected: Option<u64>,
    ) -> Option<TxReceipt> {
        let version = {
            let mut storage = self.inner.storage.write().await;
            let entry = storage.entry(key.to_string()).or_default();
            if expected.is_some_and(|v| v != entry.version) {
                return None;
            }
            entry.version += 1;
            entry.data.clone_from(&value);
            entry.version
        };
        self.inner
            .write_log
            .write()
            .await
            .push((self.account.clone(), key.to_string()));
        Some(self.receipt(key, &value, version))
    }

    async fn apply_staged(&self, key: &str) {
        let next = {
            let mut staged = self.inner.staged.write().await;
            match staged.get_mut(key) {
                Some(queue) if !queue.is_empty() => Some(queue.remove(0)),
                _ => None,
            }
        };
        if let Some(value) = next {
            let mut storage = self.inner.storage.write().await;
            let entry = storage.entry(key.to_string()).or_default();
            entry.version += 1;
            entry.data = value;
        }
    }

    /// Raw value stored under `key` (for test assertions).
    pub async fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.inner
            .storage
            .read()
            .await
            .get(key)
            .map(|e| e.data.clone())
            .filter(|d| !d.is_empty())
    }

    /// Get a snapshot of all stored data (for test assertions).
    pub async fn snapshot(&self) -> HashMap<String, Vec<u8>> {
        let storage = self.inner.storage.read().await;
        storage
            .iter()
            .map(|(k, v)| (k.clone(), v.data.clone()))
            .collect()
    }

    /// Committed writes so far, as (writer, key) pairs.
    pub async fn write_log(&self) -> Vec<(String, String)> {
        self.inner.write_log.read().await.clone()
    }

    /// Number of committed writes.
    pub async fn write_count(&self) -> usize {
        self.inner.write_log.read().await.len()
    }
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Ledger for MockLedger {
    async fn is_available(&self) -> Result<bool> {
        if matches!(
            *self.inner.fail_mode.read().await,
            Some(MockLedgerFailure::All)
        ) {
            return Err(anyhow!("MockLedger: simulated availability failure"));
        }
        Ok(!self.inner.unavailable.load(Ordering::SeqCst))
    }

    async fn get_entry(&self, key: &str) -> Result<LedgerEntry> {
        if self.should_fail(false, key).await {
            return Err(anyhow!("MockLedger: simulated read failure on {key}"));
        }

        let entry = self
            .inner
            .storage
            .read()
            .await
            .get(key)
            .cloned()
            .unwrap_or_default();
        self.apply_staged(key).await;
        Ok(entry)
    }

    async fn set_data(&self, key: &str, value: Vec<u8>) -> Result<TxReceipt> {
        if self.should_fail(true, key).await {
            return Err(anyhow!("MockLedger: simulated write failure on {key}"));
        }
        self.commit(key, value, None)
            .await
            .ok_or_else(|| anyhow!("MockLedger: unconditional write rejected on {key}"))
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected_version: u64,
        value: Vec<u8>,
    ) -> Result<Option<TxReceipt>> {
        if self.should_fail(true, key).await {
            return Err(anyhow!("MockLedger: simulated write failure on {key}"));
        }

        Ok(self.commit(key, value, Some(expected_version)).await)
    }
}
