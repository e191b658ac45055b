//! Mock injected wallet provider.

use crate::traits::WalletProvider;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Wallet that hands out a fixed account list and lets tests fire
/// `accountsChanged`.
#[derive(Debug, Clone)]
pub struct MockWallet {
    accounts: Arc<Mutex<Vec<String>>>,
    reject: Arc<Mutex<bool>>,
    events: broadcast::Sender<Vec<String>>,
}

impl MockWallet {
    pub fn new(accounts: Vec<String>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            accounts: Arc::new(Mutex::new(accounts)),
            reject: Arc::new(Mutex::new(false)),
            events,
        }
    }

    /// Make `request_accounts` fail as if the user dismissed the prompt.
    pub fn set_reject(&self, reject: bool) {
        *self.reject.lock() = reject;
    }

    /// Switch accounts and notify subscribers.
    pub fn change_accounts(&self, accounts: Vec<String>) {
        *self.accounts.lock() = accounts.clone();
        // No subscribers is fine.
        let _ = self.events.send(accounts);
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> Result<Vec<String>> {
        if *self.reject.lock() {
            return Err(anyhow!("user rejected the request"));
        }
        Ok(self.accounts.lock().clone())
    }

    fn subscribe_accounts_changed(&self) -> broadcast::Receiver<Vec<String>> {
        self.events.subscribe()
    }
}
