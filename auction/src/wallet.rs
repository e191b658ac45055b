//! Wallet session: the connected account and its `accountsChanged` feed.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{AuctionError, AuctionResult};
use crate::traits::WalletProvider;

/// Tracks which account (if any) is connected.
///
/// `None` means no wallet is connected. A connected wallet that exposes no
/// accounts shows up as `Some("")`.
#[derive(Clone)]
pub struct WalletSession {
    account: Arc<watch::Sender<Option<String>>>,
    listener: Arc<Mutex<Option<CancellationToken>>>,
}

impl WalletSession {
    pub fn new() -> Self {
        let (account, _) = watch::channel(None);
        Self {
            account: Arc::new(account),
            listener: Arc::new(Mutex::new(None)),
        }
    }

    /// Request accounts from the provider and follow its account changes.
    pub async fn connect<P>(&self, provider: Arc<P>) -> AuctionResult<String>
    where
        P: WalletProvider + ?Sized + 'static,
    {
        let accounts = provider.request_accounts().await.map_err(|e| {
            warn!("Wallet connection failed: {e:#}");
            AuctionError::Wallet("Failed to connect wallet".into())
        })?;
        let account = first_account(&accounts);

        let token = CancellationToken::new();
        if let Some(previous) = self.listener.lock().replace(token.clone()) {
            previous.cancel();
        }
        self.account.send_replace(Some(account.clone()));
        tokio::spawn(follow_accounts(
            provider.subscribe_accounts_changed(),
            self.account.clone(),
            token,
        ));

        info!("Wallet connected: {}", display_account(&account));
        Ok(account)
    }

    /// Forget the account and stop following the provider.
    pub fn disconnect(&self) {
        if let Some(token) = self.listener.lock().take() {
            token.cancel();
        }
        self.account.send_replace(None);
        info!("Wallet disconnected");
    }

    pub fn is_connected(&self) -> bool {
        self.account.borrow().is_some()
    }

    pub fn account(&self) -> Option<String> {
        self.account.borrow().clone()
    }

    /// Whether `address` is the connected account (case-insensitive).
    pub fn is_owner(&self, address: &str) -> bool {
        self.account
            .borrow()
            .as_deref()
            .is_some_and(|acc| !acc.is_empty() && acc.eq_ignore_ascii_case(address))
    }

    /// Watch the connected account.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.account.subscribe()
    }
}

impl Default for WalletSession {
    fn default() -> Self {
        Self::new()
    }
}

fn first_account(accounts: &[String]) -> String {
    accounts.first().cloned().unwrap_or_default()
}

fn display_account(account: &str) -> &str {
    if account.is_empty() {
        "<no account>"
    } else {
        account
    }
}

async fn follow_accounts(
    mut events: broadcast::Receiver<Vec<String>>,
    account: Arc<watch::Sender<Option<String>>>,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = token.cancelled() => break,
            event = events.recv() => match event {
                Ok(accounts) => {
                    let next = first_account(&accounts);
                    debug!("accountsChanged: {}", display_account(&next));
                    account.send_replace(Some(next));
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Missed {} account change events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}

/// Provider with a fixed account list, for scripted drivers.
#[derive(Debug, Clone)]
pub struct StaticWallet {
    accounts: Vec<String>,
    events: broadcast::Sender<Vec<String>>,
}

impl StaticWallet {
    pub fn new(accounts: Vec<String>) -> Self {
        let (events, _) = broadcast::channel(4);
        Self { accounts, events }
    }
}

#[async_trait]
impl WalletProvider for StaticWallet {
    async fn request_accounts(&self) -> Result<Vec<String>> {
        Ok(self.accounts.clone())
    }

    fn subscribe_accounts_changed(&self) -> broadcast::Receiver<Vec<String>> {
        self.events.subscribe()
    }
}
