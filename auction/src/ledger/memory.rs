//! Process-local ledger for scripted runs of the headless driver.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::traits::{Ledger, LedgerEntry, TxReceipt};

/// Versioned key-value store held in memory. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    storage: Arc<RwLock<HashMap<String, LedgerEntry>>>,
    tx_counter: Arc<AtomicU64>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn receipt(&self, key: &str, value: &[u8], version: u64) -> TxReceipt {
        let nonce = self.tx_counter.fetch_add(1, Ordering::SeqCst);
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        hasher.update(value);
        hasher.update(version.to_le_bytes());
        hasher.update(nonce.to_le_bytes());
        TxReceipt {
            tx_hash: format!("0x{}", hex::encode(hasher.finalize())),
            version,
        }
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn is_available(&self) -> Result<bool> {
        Ok(true)
    }

    async fn get_entry(&self, key: &str) -> Result<LedgerEntry> {
        Ok(self
            .storage
            .read()
            .await
            .get(key)
            .cloned()
            .unwrap_or_default())
    }

    async fn set_data(&self, key: &str, value: Vec<u8>) -> Result<TxReceipt> {
        let mut storage = self.storage.write().await;
        let entry = storage.entry(key.to_string()).or_default();
        entry.version += 1;
        entry.data.clone_from(&value);
        Ok(self.receipt(key, &value, entry.version))
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected_version: u64,
        value: Vec<u8>,
    ) -> Result<Option<TxReceipt>> {
        // Hold the write lock across check and write.
        let mut storage = self.storage.write().await;
        let entry = storage.entry(key.to_string()).or_default();
        if entry.version != expected_version {
            return Ok(None);
        }
        entry.version += 1;
        entry.data.clone_from(&value);
        Ok(Some(self.receipt(key, &value, entry.version)))
    }
}
