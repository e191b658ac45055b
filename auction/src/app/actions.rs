//! User-facing auction flows: refresh, wallet, place bid, determine winner.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::app::state::{AppState, StatusKind, Tab, TransactionStatus};
use crate::error::{AuctionError, AuctionResult};
use crate::ledger::{AuctionController, ResolveOutcome};
use crate::marketplace::{BidDraft, BidRecord};
use crate::traits::{Ledger, RandomSource, TimeProvider, WalletProvider};
use crate::wallet::WalletSession;

/// Substring the wallet puts in errors when the user declines to sign.
pub const USER_REJECTED_MARKER: &str = "user rejected transaction";

const MSG_CONNECT_FIRST: &str = "Please connect wallet first";
const MSG_FILL_REQUIRED: &str = "Please fill required fields";
const MSG_ENCRYPTING: &str = "Encrypting bid with FHE technology...";
const MSG_SUBMITTED: &str = "Encrypted bid submitted securely!";
const MSG_REJECTED: &str = "Transaction rejected by user";
const MSG_RESOLVING: &str = "Processing encrypted bids with FHE to determine winner...";
const MSG_RESOLVED: &str = "FHE auction completed! Winner determined while preserving bid privacy.";

/// Banner text for a failed submission.
pub fn submit_failure_message(err: &AuctionError) -> String {
    let message = err.to_string();
    if message.contains(USER_REJECTED_MARKER) {
        MSG_REJECTED.to_string()
    } else {
        format!("Bid submission failed: {message}")
    }
}

/// Session-scoped auction application.
pub struct AuctionApp<L, C, R>
where
    L: Ledger,
    C: TimeProvider,
    R: RandomSource,
{
    controller: Arc<AuctionController<L, C, R>>,
    wallet: WalletSession,
    state: Arc<watch::Sender<AppState>>,
    /// Bumped on every banner change so stale dismiss timers do nothing
    banner_generation: Arc<AtomicU64>,
    following_wallet: AtomicBool,
}

impl<L, C, R> AuctionApp<L, C, R>
where
    L: Ledger + 'static,
    C: TimeProvider + 'static,
    R: RandomSource + 'static,
{
    pub fn new(controller: AuctionController<L, C, R>) -> Self {
        let (state, _) = watch::channel(AppState::default());
        Self {
            controller: Arc::new(controller),
            wallet: WalletSession::new(),
            state: Arc::new(state),
            banner_generation: Arc::new(AtomicU64::new(0)),
            following_wallet: AtomicBool::new(false),
        }
    }

    pub fn controller(&self) -> &AuctionController<L, C, R> {
        &self.controller
    }

    pub const fn wallet(&self) -> &WalletSession {
        &self.wallet
    }

    /// Current state.
    pub fn state(&self) -> AppState {
        self.state.borrow().clone()
    }

    /// Receive every state change.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    fn update(&self, f: impl FnOnce(&mut AppState)) {
        self.state.send_modify(f);
    }

    /// Reload bids from the ledger. Failures are logged, not surfaced.
    pub async fn refresh(&self) {
        self.update(|s| s.refreshing = true);
        let loaded = self.controller.load().await;
        self.update(|s| {
            match loaded {
                Ok(bids) => s.set_bids(bids),
                Err(e) => error!("Error loading bids: {}", e),
            }
            s.refreshing = false;
            s.loading = false;
        });
    }

    pub async fn connect_wallet<P>(&self, provider: Arc<P>) -> AuctionResult<String>
    where
        P: WalletProvider + ?Sized + 'static,
    {
        match self.wallet.connect(provider).await {
            Ok(account) => {
                self.update(|s| s.account = Some(account.clone()));
                self.follow_wallet();
                Ok(account)
            }
            Err(e) => {
                self.update(|s| s.alert = Some("Failed to connect wallet".to_string()));
                Err(e)
            }
        }
    }

    pub fn disconnect_wallet(&self) {
        self.wallet.disconnect();
        self.update(|s| s.account = None);
    }

    /// Mirror wallet account changes into the app state, once per app.
    fn follow_wallet(&self) {
        if self.following_wallet.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut accounts = self.wallet.subscribe();
        let state = self.state.clone();
        tokio::spawn(async move {
            while accounts.changed().await.is_ok() {
                let account = accounts.borrow_and_update().clone();
                state.send_modify(|s| s.account = account);
            }
        });
    }

    pub fn set_tab(&self, tab: Tab) {
        self.update(|s| s.active_tab = tab);
    }

    pub fn toggle_tutorial(&self) {
        self.update(|s| s.show_tutorial = !s.show_tutorial);
    }

    pub fn open_bid_modal(&self) {
        self.update(|s| s.show_bid_modal = true);
    }

    pub fn close_bid_modal(&self) {
        self.update(|s| s.show_bid_modal = false);
    }

    pub fn update_draft(&self, draft: BidDraft) {
        self.update(|s| s.draft = draft);
    }

    pub fn dismiss_alert(&self) {
        self.update(|s| s.alert = None);
    }

    fn alert(&self, message: &str) {
        self.update(|s| s.alert = Some(message.to_string()));
    }

    fn show_banner(&self, kind: StatusKind, message: impl Into<String>) -> u64 {
        let generation = self.banner_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let status = TransactionStatus::show(kind, message);
        self.update(|s| s.transaction = status);
        generation
    }

    /// Hide the banner after `after`, unless a newer banner replaced it.
    fn schedule_dismiss(&self, after: Duration, generation: u64, reset_form: bool) {
        let state = self.state.clone();
        let current = self.banner_generation.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let still_ours = current.load(Ordering::SeqCst) == generation;
            state.send_modify(|s| {
                if still_ours {
                    s.transaction = TransactionStatus::hidden();
                }
                if reset_form {
                    s.show_bid_modal = false;
                    s.draft = BidDraft::default();
                }
            });
        });
    }

    /// Submit the current draft as the connected account.
    pub async fn place_bid(&self) -> AuctionResult<BidRecord> {
        let draft = self.state.borrow().draft.clone();
        if let Err(e) = draft.validate() {
            self.alert(MSG_FILL_REQUIRED);
            return Err(e);
        }
        let Some(account) = self.wallet.account() else {
            self.alert(MSG_CONNECT_FIRST);
            return Err(AuctionError::Wallet("wallet not connected".into()));
        };

        self.update(|s| s.bidding = true);
        self.show_banner(StatusKind::Pending, MSG_ENCRYPTING);

        let result = self.controller.submit(&account, &draft).await;
        let config = self.controller.config();
        match &result {
            Ok(bid) => {
                info!("Bid {} placed by {}", bid.id, account);
                let generation = self.show_banner(StatusKind::Success, MSG_SUBMITTED);
                self.refresh().await;
                self.schedule_dismiss(config.success_dismiss, generation, true);
            }
            Err(e) => {
                warn!("Bid submission failed: {}", e);
                let generation = self.show_banner(StatusKind::Error, submit_failure_message(e));
                self.schedule_dismiss(config.error_dismiss, generation, false);
            }
        }

        self.update(|s| s.bidding = false);
        result
    }

    /// Run winner determination over the loaded active bids.
    pub async fn determine_winner(&self) -> AuctionResult<ResolveOutcome> {
        if !self.wallet.is_connected() {
            self.alert(MSG_CONNECT_FIRST);
            return Err(AuctionError::Wallet("wallet not connected".into()));
        }

        self.show_banner(StatusKind::Pending, MSG_RESOLVING);
        let config = self.controller.config();
        tokio::time::sleep(config.resolve_delay).await;

        let result = self.controller.resolve().await;
        match &result {
            Ok(outcome) => {
                info!(
                    "Auction resolved: {} won at {} ({} bids updated)",
                    outcome.winner_id, outcome.winning_amount, outcome.updated
                );
                let generation = self.show_banner(StatusKind::Success, MSG_RESOLVED);
                self.refresh().await;
                self.schedule_dismiss(config.success_dismiss, generation, false);
            }
            Err(e) => {
                warn!("Auction processing failed: {}", e);
                let generation = self.show_banner(
                    StatusKind::Error,
                    format!("Auction processing failed: {e}"),
                );
                self.schedule_dismiss(config.error_dismiss, generation, false);
            }
        }
        result
    }
}
