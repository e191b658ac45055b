//! Wallet provider abstraction (an injected EIP-1193 style provider).

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Capability exposed by an injected wallet provider.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the wallet for account access (`eth_requestAccounts`).
    async fn request_accounts(&self) -> Result<Vec<String>>;

    /// Subscribe to `accountsChanged` notifications.
    fn subscribe_accounts_changed(&self) -> broadcast::Receiver<Vec<String>>;
}
